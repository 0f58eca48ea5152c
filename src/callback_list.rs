use log::{trace, warn};

use crate::{callback::Callback, callback_error::CallbackError, hook::Hook, run_context::RunContext};

/// An ordered collection of callbacks, used by a host loop to call a hook on every registered callback.
///
/// Callbacks are called in registration order and all share the context passed to [`CallbackList::dispatch`],
/// so a change one callback makes to the context is visible to the callbacks registered after it.
///
/// The lifetime lets the list hold borrowed callbacks, so the caller can inspect them after the run:
/// ```
/// use trainhook::{CallbackList, Hook, HookRecorder, RunContext};
///
/// let mut recorder = HookRecorder::new();
/// {
///     let mut callbacks = CallbackList::new();
///     callbacks.push(&mut recorder);
///     callbacks.dispatch(Hook::TrainBegin, &mut RunContext::default())?;
/// }
/// assert_eq!(recorder.hooks(), &[Hook::TrainBegin]);
/// # Ok::<(), trainhook::CallbackError>(())
/// ```
pub struct CallbackList<'a, C: ?Sized = RunContext> {
    callbacks: Vec<Box<dyn Callback<C> + 'a>>,
}

impl<'a, C: ?Sized> CallbackList<'a, C> {
    /// Create an empty list
    pub fn new() -> Self {
        CallbackList {
            callbacks: Vec::new(),
        }
    }

    /// Register a callback after all callbacks already in the list
    pub fn push<T: Callback<C> + 'a>(&mut self, callback: T) {
        self.callbacks.push(Box::new(callback));
    }

    /// Register a callback and return the list, for chaining
    pub fn with<T: Callback<C> + 'a>(mut self, callback: T) -> Self {
        self.push(callback);
        self
    }

    /// the number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// true if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// the [names](Callback::name) of the registered callbacks, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|callback| callback.name()).collect()
    }

    /// Call `hook` on every registered callback, in registration order.
    ///
    /// # Errors
    /// Stops at the first callback that fails and returns a [`CallbackError`] wrapping its error. Callbacks after the failing one are not called.
    pub fn dispatch(&mut self, hook: Hook, run_context: &mut C) -> Result<(), CallbackError> {
        for (index, callback) in self.callbacks.iter_mut().enumerate() {
            trace!("{} -> callback {} ({})", hook, index, callback.name());
            hook.invoke(&mut **callback, run_context)
                .map_err(|source| CallbackError {
                    hook,
                    callback: callback.name().to_string(),
                    index,
                    source,
                })?;
        }
        Ok(())
    }

    /// Call [`Callback::exception`] on every registered callback, in registration order.
    ///
    /// Unlike [`CallbackList::dispatch`], a failing callback does not stop the remaining callbacks from being notified.
    /// Every failure is logged and returned.
    pub fn notify_exception(&mut self, run_context: &mut C) -> Vec<CallbackError> {
        let mut failures = Vec::new();
        for (index, callback) in self.callbacks.iter_mut().enumerate() {
            trace!("{} -> callback {} ({})", Hook::Exception, index, callback.name());
            if let Err(source) = callback.exception(run_context) {
                let failure = CallbackError {
                    hook: Hook::Exception,
                    callback: callback.name().to_string(),
                    index,
                    source,
                };
                warn!("{}", failure);
                failures.push(failure);
            }
        }
        failures
    }
}

impl<C: ?Sized> Default for CallbackList<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> std::fmt::Debug for CallbackList<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CallbackList")
            .field("callbacks", &self.names())
            .finish()
    }
}
