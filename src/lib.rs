#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Lifecycle callbacks for observing and steering machine-learning training loops.
//!
//! The `trainhook` crate defines the [`Callback`] trait: a fixed set of hooks that a host training loop calls at well-defined points of a run,
//! passing a shared, mutable run context to each. Every hook does nothing by default, so a callback only overrides the points it cares about.
//!
//! The crate doesn't train anything. Hosts own the training loop and call the hooks, usually through a [`CallbackList`], which calls a hook on every
//! registered callback in registration order.
//! The [`run_lifecycle`] function replays the hook order of a run without doing any work, which is useful for testing callbacks,
//! and the [callbacks] module contains ready-made callbacks for logging, timing, early stopping and progress reporting.
//!
//! # Examples
//! Write a callback that stops a run once the loss is low enough, and replay a run of 10 epochs with it:
//! ```
//! use trainhook::{run_lifecycle, Callback, CallbackList, HookRecorder, HookResult, Hook, LifecycleOptions, RunContext};
//!
//! struct GoodEnough;
//!
//! impl Callback for GoodEnough {
//!     fn train_epoch_end(&mut self, run_context: &mut RunContext) -> HookResult {
//!         // a real host would report the loss; pretend it halves every epoch
//!         run_context.loss = Some(1.0 / 2f64.powi(run_context.epoch as i32));
//!         if run_context.loss < Some(0.1) {
//!             run_context.request_stop();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let options = LifecycleOptions {
//!     num_epochs: 10,
//!     steps_per_epoch: 20,
//!     ..LifecycleOptions::default()
//! };
//! let mut recorder = HookRecorder::new();
//! let mut callbacks = CallbackList::new().with(GoodEnough).with(&mut recorder);
//! let mut run_context = RunContext::default();
//!
//! run_lifecycle(&mut callbacks, &mut run_context, &options)?;
//! drop(callbacks);
//!
//! assert_eq!(run_context.epoch, 4);
//! assert_eq!(recorder.count(Hook::TrainEpochEnd), 4);
//! assert_eq!(recorder.hooks().last(), Some(&Hook::TrainEnd));
//! # Ok::<(), trainhook::LifecycleError>(())
//! ```

/// Contains the [`Callback`] trait, the extension point of the crate.
pub mod callback;
/// Contains the error returned when a registered callback fails.
pub mod callback_error;
/// Contains [`CallbackList`], which calls a hook on many callbacks in order.
pub mod callback_list;
pub mod callbacks;
/// Contains the [`Hook`] enum, which names each hook of the [`Callback`] trait.
pub mod hook;
/// Contains the error returned by [`run_lifecycle`].
pub mod lifecycle_error;
/// Options for replaying a run with [`run_lifecycle`].
pub mod lifecycle_options;
/// Contains [`RunContext`], the default state shared between a host and its callbacks.
pub mod run_context;

pub use callback::{Callback, HookError, HookResult};
pub use callback_error::CallbackError;
pub use callback_list::CallbackList;
pub use callbacks::{EarlyStopping, HookRecorder, LossMonitor, TimeMonitor, TrainingProgress};
pub use hook::Hook;
pub use lifecycle_error::LifecycleError;
pub use lifecycle_options::{ExecutionMode, LifecycleOptions, LifecycleOptionsError};
pub use run_context::RunContext;

use log::{debug, info, warn};

/// The hooks reported for each step when steps are executed one at a time
const STEP_HOOKS: [Hook; 6] = [
    Hook::FetchDataBegin,
    Hook::FetchDataEnd,
    Hook::TrainStepBegin,
    Hook::BeforeOptimizerStep,
    Hook::AfterOptimizerStep,
    Hook::TrainStepEnd,
];

/// The hooks reported for each chunk of steps in sink mode
const SINK_HOOKS: [Hook; 4] = [
    Hook::FetchDataBegin,
    Hook::FetchDataEnd,
    Hook::DsSinkBegin,
    Hook::DsSinkEnd,
];

/// Replay the hooks of a run shaped by `options` through the provided callbacks, without doing any training work.
///
/// The hooks are called in this order, where bracketed hooks depend on the options:
/// ```text
/// [load_model] [load_checkpoint] train_begin
/// for each epoch:
///     train_epoch_begin
///     step by step: for each step:
///         fetch_data_begin fetch_data_end train_step_begin before_optimizer_step after_optimizer_step train_step_end
///     sink mode: for each chunk of sink_size steps:
///         fetch_data_begin fetch_data_end ds_sink_begin ds_sink_end
///     train_epoch_end
///     [evaluate_begin evaluate_end]  every `evaluate_every` epochs
///     [save_checkpoint]              every `checkpoint_every` epochs
/// [save_model] train_end
/// ```
///
/// The run starts from a [reset](RunContext::reset_run) context, so a context can be reused across runs.
/// Before each hook the epoch and step counters of `run_context` are brought up to date. Every other field is left to the callbacks.
///
/// If a callback [requests a stop](RunContext::request_stop), the remaining steps of the current epoch are skipped, the epoch is closed as usual,
/// and no further epochs start.
///
/// # Errors
/// * returns [`LifecycleError::InvalidOptions`] without calling any hook if the options are [invalid](LifecycleOptions::validate).
/// * returns [`LifecycleError::Callback`] if a callback fails. The run stops at the failing hook, [`RunContext::exception`] is set to a description of the failure,
///   and [`Callback::exception`] is called on every callback. Then, if `train_begin` had been reached and the failure didn't come from `train_end`,
///   `train_end` is called once more so callbacks can close out the run. Failures during this cleanup are logged and otherwise ignored.
pub fn run_lifecycle(
    callbacks: &mut CallbackList<RunContext>,
    run_context: &mut RunContext,
    options: &LifecycleOptions,
) -> Result<(), LifecycleError> {
    options.validate()?;
    run_context.reset_run(options.num_epochs, options.steps_per_epoch);
    debug!(
        "replaying {} epochs of {} steps ({:?}) through {} callbacks",
        options.num_epochs,
        options.steps_per_epoch,
        options.execution,
        callbacks.len()
    );

    let mut train_begun = false;
    let failure = match replay(callbacks, run_context, options, &mut train_begun) {
        Ok(()) => return Ok(()),
        Err(failure) => failure,
    };

    warn!("{}", failure);
    run_context.exception = Some(failure.to_string());
    callbacks.notify_exception(run_context);
    if train_begun && failure.hook != Hook::TrainEnd {
        if let Err(e) = callbacks.dispatch(Hook::TrainEnd, run_context) {
            warn!("{} while closing out a failed run", e);
        }
    }
    Err(failure.into())
}

fn replay(
    callbacks: &mut CallbackList<RunContext>,
    run_context: &mut RunContext,
    options: &LifecycleOptions,
    train_begun: &mut bool,
) -> Result<(), CallbackError> {
    if options.load_model {
        callbacks.dispatch(Hook::LoadModel, run_context)?;
    }
    if options.resume_from_checkpoint {
        callbacks.dispatch(Hook::LoadCheckpoint, run_context)?;
    }
    *train_begun = true;
    callbacks.dispatch(Hook::TrainBegin, run_context)?;

    for epoch in 1..=options.num_epochs {
        if run_context.stop_requested() {
            info!("stop requested, ending training before epoch {}", epoch);
            break;
        }
        run_context.epoch = epoch;
        run_context.step = 0;
        callbacks.dispatch(Hook::TrainEpochBegin, run_context)?;

        match options.execution {
            ExecutionMode::StepByStep => {
                for step in 1..=options.steps_per_epoch {
                    run_context.step = step;
                    run_context.global_step += 1;
                    for hook in STEP_HOOKS {
                        callbacks.dispatch(hook, run_context)?;
                    }
                    if run_context.stop_requested() {
                        break;
                    }
                }
            }
            ExecutionMode::Sink { sink_size } => {
                let mut steps_done = 0;
                while steps_done < options.steps_per_epoch {
                    let chunk = sink_size.min(options.steps_per_epoch - steps_done);
                    steps_done += chunk;
                    // the step counter points at the last step of the chunk
                    run_context.step = steps_done;
                    run_context.global_step += chunk;
                    for hook in SINK_HOOKS {
                        callbacks.dispatch(hook, run_context)?;
                    }
                    if run_context.stop_requested() {
                        break;
                    }
                }
            }
        }

        callbacks.dispatch(Hook::TrainEpochEnd, run_context)?;
        if is_due(options.evaluate_every, epoch) {
            callbacks.dispatch(Hook::EvaluateBegin, run_context)?;
            callbacks.dispatch(Hook::EvaluateEnd, run_context)?;
        }
        if is_due(options.checkpoint_every, epoch) {
            callbacks.dispatch(Hook::SaveCheckpoint, run_context)?;
        }
    }

    if options.save_model {
        callbacks.dispatch(Hook::SaveModel, run_context)?;
    }
    callbacks.dispatch(Hook::TrainEnd, run_context)
}

fn is_due(every: Option<usize>, epoch: usize) -> bool {
    every.is_some_and(|interval| epoch % interval == 0)
}

/// Returns the hooks, in order, that [`run_lifecycle`] calls for a run shaped by `options` when no callback requests a stop.
///
/// # Errors
/// returns [`LifecycleError::InvalidOptions`] if the options are [invalid](LifecycleOptions::validate).
///
/// # Example
/// ```
/// use trainhook::{lifecycle_sequence, ExecutionMode, Hook, LifecycleOptions};
///
/// let options = LifecycleOptions {
///     steps_per_epoch: 3,
///     execution: ExecutionMode::Sink { sink_size: 3 },
///     ..LifecycleOptions::default()
/// };
/// assert_eq!(
///     lifecycle_sequence(&options)?,
///     vec![
///         Hook::TrainBegin,
///         Hook::TrainEpochBegin,
///         Hook::FetchDataBegin,
///         Hook::FetchDataEnd,
///         Hook::DsSinkBegin,
///         Hook::DsSinkEnd,
///         Hook::TrainEpochEnd,
///         Hook::TrainEnd,
///     ]
/// );
/// # Ok::<(), trainhook::LifecycleError>(())
/// ```
pub fn lifecycle_sequence(options: &LifecycleOptions) -> Result<Vec<Hook>, LifecycleError> {
    let mut recorder = HookRecorder::new();
    run_lifecycle(
        &mut CallbackList::new().with(&mut recorder),
        &mut RunContext::default(),
        options,
    )?;
    Ok(recorder.into_hooks())
}

// EmptyCallback is basically a singleton, so there's no point in implementing any other common traits
/// A callback that does nothing when called.
///
/// Every hook uses the default implementation of [`Callback`], so it works with any context type.
#[derive(Default)]
pub struct EmptyCallback {}

impl EmptyCallback {
    /// Create a new instance of the EmptyCallback
    pub fn new() -> Self {
        EmptyCallback {}
    }
}

impl<C: ?Sized> Callback<C> for EmptyCallback {
    fn name(&self) -> &str {
        "EmptyCallback"
    }
}
