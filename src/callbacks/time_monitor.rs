use chrono::{DateTime, Local};
use log::info;

use crate::{
    callback::{Callback, HookResult},
    run_context::RunContext,
};

/// The [metric](RunContext::metric) under which [`TimeMonitor`] stores the duration of the last epoch, in milliseconds
pub const EPOCH_TIME_METRIC: &str = "epoch_time_ms";
/// The [metric](RunContext::metric) under which [`TimeMonitor`] stores the average step duration of the last epoch, in milliseconds
pub const STEP_TIME_METRIC: &str = "step_time_ms";

/// Times each epoch, logging the epoch duration and the average time per step when the epoch ends.
///
/// Durations are also stored in the run context under [`EPOCH_TIME_METRIC`] and [`STEP_TIME_METRIC`], for the callbacks registered after this one.
#[derive(Clone, Debug, Default)]
pub struct TimeMonitor {
    epoch_start: Option<DateTime<Local>>,
}

impl TimeMonitor {
    /// Create a new monitor
    pub fn new() -> Self {
        TimeMonitor { epoch_start: None }
    }
}

impl Callback for TimeMonitor {
    fn train_epoch_begin(&mut self, _run_context: &mut RunContext) -> HookResult {
        self.epoch_start = Some(Local::now());
        Ok(())
    }

    fn train_epoch_end(&mut self, run_context: &mut RunContext) -> HookResult {
        let Some(start) = self.epoch_start.take() else {
            return Ok(());
        };
        let elapsed = Local::now() - start;
        let epoch_ms = elapsed
            .num_microseconds()
            .map_or(elapsed.num_milliseconds() as f64, |us| us as f64 / 1000.0);
        let step_ms = epoch_ms / run_context.step.max(1) as f64;
        info!(
            "{} epoch {} took {:.3} ms, {:.3} ms per step",
            start, run_context.epoch, epoch_ms, step_ms
        );
        run_context.set_metric(EPOCH_TIME_METRIC, epoch_ms);
        run_context.set_metric(STEP_TIME_METRIC, step_ms);
        Ok(())
    }

    fn name(&self) -> &str {
        "TimeMonitor"
    }
}
