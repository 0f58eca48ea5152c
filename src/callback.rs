use crate::run_context::RunContext;

/// The error type a hook override may fail with.
///
/// Any error type can be boxed into a `HookError`, and callers can recover the original with [`downcast_ref`](std::error::Error::downcast_ref) or [`Box::downcast`].
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The value returned by every hook. The default implementations always return `Ok(())`.
pub type HookResult = Result<(), HookError>;

/// Structs implementing this trait can observe and steer a training run.
///
/// A host training loop calls each hook synchronously at a fixed point of the run, passing the shared run context it owns.
/// Every hook has a default implementation that does nothing and never fails, so an implementer overrides only the hooks it cares about.
///
/// Within one run the host calls the hooks in this order:
/// 1. [`train_begin`](Callback::train_begin), once
/// 2. for each epoch, [`train_epoch_begin`](Callback::train_epoch_begin), then for each step
///    [`fetch_data_begin`](Callback::fetch_data_begin), [`fetch_data_end`](Callback::fetch_data_end),
///    [`train_step_begin`](Callback::train_step_begin), [`before_optimizer_step`](Callback::before_optimizer_step),
///    [`after_optimizer_step`](Callback::after_optimizer_step), [`train_step_end`](Callback::train_step_end).
///    In sink mode, [`ds_sink_begin`](Callback::ds_sink_begin) and [`ds_sink_end`](Callback::ds_sink_end) bracket each sunk chunk instead of the step hooks.
///    [`train_epoch_end`](Callback::train_epoch_end) closes the epoch
/// 3. [`train_end`](Callback::train_end), once
///
/// The model, checkpoint, evaluation and [`exception`](Callback::exception) hooks are called whenever the host performs the matching operation.
///
/// The context type defaults to [`RunContext`], but any host-defined type can be used.
/// When several callbacks are registered with a host they all see the same context, in registration order,
/// so a mutation made by one callback is visible to every callback after it.
///
/// # Errors
/// A failing override returns its error, which the host receives unmodified. What happens next (calling [`Callback::exception`], aborting, continuing) is up to the host.
///
/// # Example
/// ```
/// use trainhook::{Callback, HookResult, RunContext};
///
/// struct StopAfterThreeSteps;
///
/// impl Callback for StopAfterThreeSteps {
///     fn train_step_end(&mut self, run_context: &mut RunContext) -> HookResult {
///         if run_context.global_step >= 3 {
///             run_context.request_stop();
///         }
///         Ok(())
///     }
/// }
///
/// let mut run_context = RunContext::default();
/// let mut callback = StopAfterThreeSteps;
/// run_context.global_step = 3;
/// callback.train_begin(&mut run_context)?; // inherited, does nothing
/// callback.train_step_end(&mut run_context)?;
/// assert!(run_context.stop_requested());
/// # Ok::<(), trainhook::HookError>(())
/// ```
pub trait Callback<C: ?Sized = RunContext> {
    /// Called once before the run starts any training work
    fn train_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called once after training concludes
    fn train_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before each epoch begins
    fn train_epoch_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after each epoch finishes
    fn train_epoch_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before fetching each batch, or each sink-sized chunk of data in sink mode
    fn fetch_data_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after fetching each batch, or each sink-sized chunk of data in sink mode
    fn fetch_data_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before each step begins
    fn train_step_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after each step finishes
    fn train_step_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before each data sink begins
    fn ds_sink_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after each data sink finishes
    fn ds_sink_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before the host loads a model
    fn load_model(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before the host saves a model
    fn save_model(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before the host loads a checkpoint
    fn load_checkpoint(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before the host saves a checkpoint
    fn save_checkpoint(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before evaluating an epoch, a number of steps, or a dataset
    fn evaluate_begin(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after evaluating an epoch, a number of steps, or a dataset
    fn evaluate_end(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called before the optimizer updates the model
    fn before_optimizer_step(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called after the optimizer updates the model
    fn after_optimizer_step(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// Called by the host when a hook or the training body fails. Useful for inspecting the context and cleaning up
    fn exception(&mut self, _run_context: &mut C) -> HookResult {
        Ok(())
    }

    /// A human-readable name for this callback, used in logs and in [`CallbackError`](crate::CallbackError).
    /// Defaults to the name of the implementing type
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// lending a callback to a host lets the caller inspect it once the run is over
impl<C: ?Sized, T: Callback<C> + ?Sized> Callback<C> for &mut T {
    fn train_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_begin(run_context)
    }
    fn train_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_end(run_context)
    }
    fn train_epoch_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_epoch_begin(run_context)
    }
    fn train_epoch_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_epoch_end(run_context)
    }
    fn fetch_data_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).fetch_data_begin(run_context)
    }
    fn fetch_data_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).fetch_data_end(run_context)
    }
    fn train_step_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_step_begin(run_context)
    }
    fn train_step_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_step_end(run_context)
    }
    fn ds_sink_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).ds_sink_begin(run_context)
    }
    fn ds_sink_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).ds_sink_end(run_context)
    }
    fn load_model(&mut self, run_context: &mut C) -> HookResult {
        (**self).load_model(run_context)
    }
    fn save_model(&mut self, run_context: &mut C) -> HookResult {
        (**self).save_model(run_context)
    }
    fn load_checkpoint(&mut self, run_context: &mut C) -> HookResult {
        (**self).load_checkpoint(run_context)
    }
    fn save_checkpoint(&mut self, run_context: &mut C) -> HookResult {
        (**self).save_checkpoint(run_context)
    }
    fn evaluate_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).evaluate_begin(run_context)
    }
    fn evaluate_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).evaluate_end(run_context)
    }
    fn before_optimizer_step(&mut self, run_context: &mut C) -> HookResult {
        (**self).before_optimizer_step(run_context)
    }
    fn after_optimizer_step(&mut self, run_context: &mut C) -> HookResult {
        (**self).after_optimizer_step(run_context)
    }
    fn exception(&mut self, run_context: &mut C) -> HookResult {
        (**self).exception(run_context)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: ?Sized, T: Callback<C> + ?Sized> Callback<C> for Box<T> {
    fn train_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_begin(run_context)
    }
    fn train_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_end(run_context)
    }
    fn train_epoch_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_epoch_begin(run_context)
    }
    fn train_epoch_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_epoch_end(run_context)
    }
    fn fetch_data_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).fetch_data_begin(run_context)
    }
    fn fetch_data_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).fetch_data_end(run_context)
    }
    fn train_step_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_step_begin(run_context)
    }
    fn train_step_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).train_step_end(run_context)
    }
    fn ds_sink_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).ds_sink_begin(run_context)
    }
    fn ds_sink_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).ds_sink_end(run_context)
    }
    fn load_model(&mut self, run_context: &mut C) -> HookResult {
        (**self).load_model(run_context)
    }
    fn save_model(&mut self, run_context: &mut C) -> HookResult {
        (**self).save_model(run_context)
    }
    fn load_checkpoint(&mut self, run_context: &mut C) -> HookResult {
        (**self).load_checkpoint(run_context)
    }
    fn save_checkpoint(&mut self, run_context: &mut C) -> HookResult {
        (**self).save_checkpoint(run_context)
    }
    fn evaluate_begin(&mut self, run_context: &mut C) -> HookResult {
        (**self).evaluate_begin(run_context)
    }
    fn evaluate_end(&mut self, run_context: &mut C) -> HookResult {
        (**self).evaluate_end(run_context)
    }
    fn before_optimizer_step(&mut self, run_context: &mut C) -> HookResult {
        (**self).before_optimizer_step(run_context)
    }
    fn after_optimizer_step(&mut self, run_context: &mut C) -> HookResult {
        (**self).after_optimizer_step(run_context)
    }
    fn exception(&mut self, run_context: &mut C) -> HookResult {
        (**self).exception(run_context)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
