use crate::{callback::HookError, hook::Hook};

/// Indicates that a registered callback failed while a [`CallbackList`](crate::CallbackList) was dispatching a hook
///
/// If displayed, this error will show the hook, the name and registration index of the failing callback, and the error the callback returned.
/// The callback's error is kept as-is and can be recovered with [`CallbackError::into_source`] or [`std::error::Error::source`].
#[derive(Debug)]
pub struct CallbackError {
    /// The hook that was being dispatched
    pub hook: Hook,
    /// The [name](crate::Callback::name) of the callback that failed
    pub callback: String,
    /// The registration index of the callback that failed
    pub index: usize,
    /// The error returned by the callback
    pub source: HookError,
}

impl CallbackError {
    /// Discard the dispatch information and return the error produced by the callback
    pub fn into_source(self) -> HookError {
        self.source
    }
}

impl std::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "callback {} ({}) failed during {}: {}",
            self.index, self.callback, self.hook, self.source
        )
    }
}

impl std::error::Error for CallbackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}
