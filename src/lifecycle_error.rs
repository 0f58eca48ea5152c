use crate::{callback_error::CallbackError, lifecycle_options::LifecycleOptionsError};

/// Indicates that [`run_lifecycle`](crate::run_lifecycle) could not complete a run
#[derive(Debug)]
pub enum LifecycleError {
    /// The options describe a run that can't be replayed. No hooks were called
    InvalidOptions(LifecycleOptionsError),
    /// A callback failed. The exception hooks have already been notified
    Callback(CallbackError),
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LifecycleError::InvalidOptions(e) => write!(f, "invalid lifecycle options: {}", e),
            LifecycleError::Callback(e) => write!(f, "run aborted: {}", e),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifecycleError::InvalidOptions(e) => Some(e),
            LifecycleError::Callback(e) => Some(e),
        }
    }
}

impl From<LifecycleOptionsError> for LifecycleError {
    fn from(e: LifecycleOptionsError) -> Self {
        LifecycleError::InvalidOptions(e)
    }
}

impl From<CallbackError> for LifecycleError {
    fn from(e: CallbackError) -> Self {
        LifecycleError::Callback(e)
    }
}
