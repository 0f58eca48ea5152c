use std::fmt;

use serde::{Deserialize, Serialize};

/// Used by the [`run_lifecycle`](crate::run_lifecycle) function to determine the shape of the run it replays.
///
/// Can be deserialized from a config file. Missing fields take their [default](LifecycleOptions::default) values:
/// ```
/// use trainhook::{ExecutionMode, LifecycleOptions};
///
/// let options: LifecycleOptions = serde_json::from_str(r#"{
///     "num_epochs": 3,
///     "steps_per_epoch": 10,
///     "execution": { "sink": { "sink_size": 4 } },
///     "evaluate_every": 1
/// }"#)?;
/// assert_eq!(options.execution, ExecutionMode::Sink { sink_size: 4 });
/// assert_eq!(options.checkpoint_every, None);
/// assert!(options.validate().is_ok());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleOptions {
    /// number of epochs for which to run. A run of 0 epochs only calls the hooks outside the epoch loop
    pub num_epochs: usize,
    /// number of steps in each epoch. Must be positive
    pub steps_per_epoch: usize,
    /// whether steps are reported one at a time or in sunk chunks
    pub execution: ExecutionMode,
    /// if set, an evaluation pass is bracketed after every `evaluate_every` epochs. Must be positive
    pub evaluate_every: Option<usize>,
    /// if set, a checkpoint is saved after every `checkpoint_every` epochs. Must be positive
    pub checkpoint_every: Option<usize>,
    /// whether a model is loaded before training begins
    pub load_model: bool,
    /// whether a checkpoint is loaded before training begins
    pub resume_from_checkpoint: bool,
    /// whether the model is saved once training is complete
    pub save_model: bool,
}

/// Indicates how the host feeds data to the model during an epoch
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Every step is reported with the fetch, step and optimizer hooks
    #[default]
    StepByStep,
    /// Steps are executed in chunks of `sink_size`, each reported with the fetch and data sink hooks. The last chunk of an epoch may be shorter
    Sink {
        /// the number of steps in each chunk. Must be positive
        sink_size: usize,
    },
}

impl LifecycleOptions {
    /// Create a new LifecycleOptions struct with the given parameters.
    /// # Errors
    /// Returns [`LifecycleOptionsError`] error if...
    /// * `steps_per_epoch` is 0,
    /// * `execution` is [`ExecutionMode::Sink`] with a `sink_size` of 0,
    /// * `evaluate_every` or `checkpoint_every` is `Some(0)`.
    pub fn new(
        num_epochs: usize,
        steps_per_epoch: usize,
        execution: ExecutionMode,
        evaluate_every: Option<usize>,
        checkpoint_every: Option<usize>,
        load_model: bool,
        resume_from_checkpoint: bool,
        save_model: bool,
    ) -> Result<Self, LifecycleOptionsError> {
        let options = LifecycleOptions {
            num_epochs,
            steps_per_epoch,
            execution,
            evaluate_every,
            checkpoint_every,
            load_model,
            resume_from_checkpoint,
            save_model,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the options for values that can't describe a run. Useful after building or deserializing the struct directly.
    ///
    /// # Errors
    /// See [`LifecycleOptions::new`]
    pub fn validate(&self) -> Result<(), LifecycleOptionsError> {
        if self.steps_per_epoch == 0 {
            return Err(LifecycleOptionsError::ZeroStepsPerEpoch);
        }
        if self.execution == (ExecutionMode::Sink { sink_size: 0 }) {
            return Err(LifecycleOptionsError::ZeroSinkSize);
        }
        if self.evaluate_every == Some(0) {
            return Err(LifecycleOptionsError::ZeroEvaluationInterval);
        }
        if self.checkpoint_every == Some(0) {
            return Err(LifecycleOptionsError::ZeroCheckpointInterval);
        }
        Ok(())
    }

    /// the number of step or sink chunks reported in each epoch
    pub fn chunks_per_epoch(&self) -> usize {
        match self.execution {
            ExecutionMode::StepByStep => self.steps_per_epoch,
            ExecutionMode::Sink { sink_size } => self.steps_per_epoch.div_ceil(sink_size.max(1)),
        }
    }
}

impl Default for LifecycleOptions {
    /// Returns a LifecycleOptions struct with the following default values:
    /// * `num_epochs`: 1
    /// * `steps_per_epoch`: 1
    /// * `execution`: ExecutionMode::StepByStep
    /// * `evaluate_every`: None
    /// * `checkpoint_every`: None
    /// * `load_model`: false
    /// * `resume_from_checkpoint`: false
    /// * `save_model`: false
    fn default() -> Self {
        LifecycleOptions {
            num_epochs: 1,
            steps_per_epoch: 1,
            execution: ExecutionMode::StepByStep,
            evaluate_every: None,
            checkpoint_every: None,
            load_model: false,
            resume_from_checkpoint: false,
            save_model: false,
        }
    }
}

/// Errors that can occur when creating or validating a LifecycleOptions struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOptionsError {
    /// Epochs must contain at least one step
    ZeroStepsPerEpoch,
    /// Sink mode was requested with chunks of zero steps
    ZeroSinkSize,
    /// An evaluation interval of zero epochs was requested
    ZeroEvaluationInterval,
    /// A checkpoint interval of zero epochs was requested
    ZeroCheckpointInterval,
}

impl fmt::Display for LifecycleOptionsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LifecycleOptionsError::ZeroStepsPerEpoch => {
                write!(f, "steps per epoch must be positive")
            }
            LifecycleOptionsError::ZeroSinkSize => write!(f, "sink size must be positive"),
            LifecycleOptionsError::ZeroEvaluationInterval => {
                write!(f, "evaluation interval must be positive")
            }
            LifecycleOptionsError::ZeroCheckpointInterval => {
                write!(f, "checkpoint interval must be positive")
            }
        }
    }
}

impl std::error::Error for LifecycleOptionsError {}
