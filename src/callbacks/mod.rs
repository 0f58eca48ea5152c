//! Ready-made callbacks for common monitoring and control tasks.

mod early_stopping;
mod loss_monitor;
mod progress;
mod recorder;
mod time_monitor;

pub use early_stopping::EarlyStopping;
pub use loss_monitor::{InvalidLoss, LossMonitor};
pub use progress::TrainingProgress;
pub use recorder::HookRecorder;
pub use time_monitor::{TimeMonitor, EPOCH_TIME_METRIC, STEP_TIME_METRIC};
