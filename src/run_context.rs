use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The default state shared between a host training loop and its [callbacks](crate::Callback).
///
/// The host owns the context and lends it to every hook call. Hooks read the counters the host maintains,
/// and may write to the context to talk back to the host or to later callbacks, e.g. by storing metrics or [requesting a stop](RunContext::request_stop).
///
/// Hosts that need a different shape of state can use their own type instead; [`Callback`](crate::Callback) is generic over the context.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct RunContext {
    /// the current epoch, one-indexed. 0 before the first epoch starts
    pub epoch: usize,
    /// the number of epochs the run is planned to last
    pub num_epochs: usize,
    /// the current step within the epoch, one-indexed. 0 before the first step of an epoch
    pub step: usize,
    /// the number of steps in each epoch
    pub steps_per_epoch: usize,
    /// the number of steps started across the whole run
    pub global_step: usize,
    /// the most recently reported training loss, if any
    pub loss: Option<f64>,
    /// named scalar values reported during the run, such as evaluation results
    pub metrics: FxHashMap<String, f64>,
    /// a description of the failure that caused the host to call [`Callback::exception`](crate::Callback::exception)
    pub exception: Option<String>,
    stop_requested: bool,
}

impl RunContext {
    /// Create a new context for a run of `num_epochs` epochs, each `steps_per_epoch` steps long
    pub fn new(num_epochs: usize, steps_per_epoch: usize) -> Self {
        RunContext {
            num_epochs,
            steps_per_epoch,
            ..RunContext::default()
        }
    }

    /// the number of steps the run is planned to last, across all epochs
    pub fn total_steps(&self) -> usize {
        self.num_epochs.saturating_mul(self.steps_per_epoch)
    }

    /// Prepare the context for a new run of `num_epochs` epochs of `steps_per_epoch` steps.
    ///
    /// Clears the counters, the loss, the exception and any stop request left over from a previous run. Metrics are kept.
    pub fn reset_run(&mut self, num_epochs: usize, steps_per_epoch: usize) {
        self.num_epochs = num_epochs;
        self.steps_per_epoch = steps_per_epoch;
        self.epoch = 0;
        self.step = 0;
        self.global_step = 0;
        self.loss = None;
        self.exception = None;
        self.stop_requested = false;
    }

    /// Ask the host to end training early. The host decides when to honor the request.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// true if any hook has called [`RunContext::request_stop`] during this run
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Record a named metric, replacing any previous value with the same name
    pub fn set_metric(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    /// Get a named metric, if it has been recorded
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}
