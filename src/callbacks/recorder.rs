use crate::{
    callback::{Callback, HookResult},
    hook::Hook,
};

/// A callback that remembers every hook it receives, in order.
///
/// Works with any context type. Useful for checking the order in which a host calls its hooks:
/// ```
/// use trainhook::{lifecycle_sequence, run_lifecycle, CallbackList, HookRecorder, LifecycleOptions, RunContext};
///
/// let options = LifecycleOptions::default();
/// let mut recorder = HookRecorder::new();
/// run_lifecycle(&mut CallbackList::new().with(&mut recorder), &mut RunContext::default(), &options)?;
/// assert_eq!(recorder.hooks(), lifecycle_sequence(&options)?.as_slice());
/// # Ok::<(), trainhook::LifecycleError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct HookRecorder {
    hooks: Vec<Hook>,
}

impl HookRecorder {
    /// Create a recorder that hasn't seen any hooks
    pub fn new() -> Self {
        HookRecorder { hooks: Vec::new() }
    }

    /// every hook received so far, oldest first
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// how many times `hook` has been received
    pub fn count(&self, hook: Hook) -> usize {
        self.hooks.iter().filter(|&&seen| seen == hook).count()
    }

    /// Forget every hook received so far
    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    /// Consume the recorder, returning the hooks it received
    pub fn into_hooks(self) -> Vec<Hook> {
        self.hooks
    }

    fn record(&mut self, hook: Hook) -> HookResult {
        self.hooks.push(hook);
        Ok(())
    }
}

impl<C: ?Sized> Callback<C> for HookRecorder {
    fn train_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainBegin)
    }
    fn train_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainEnd)
    }
    fn train_epoch_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainEpochBegin)
    }
    fn train_epoch_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainEpochEnd)
    }
    fn fetch_data_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::FetchDataBegin)
    }
    fn fetch_data_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::FetchDataEnd)
    }
    fn train_step_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainStepBegin)
    }
    fn train_step_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::TrainStepEnd)
    }
    fn ds_sink_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::DsSinkBegin)
    }
    fn ds_sink_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::DsSinkEnd)
    }
    fn load_model(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::LoadModel)
    }
    fn save_model(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::SaveModel)
    }
    fn load_checkpoint(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::LoadCheckpoint)
    }
    fn save_checkpoint(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::SaveCheckpoint)
    }
    fn evaluate_begin(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::EvaluateBegin)
    }
    fn evaluate_end(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::EvaluateEnd)
    }
    fn before_optimizer_step(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::BeforeOptimizerStep)
    }
    fn after_optimizer_step(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::AfterOptimizerStep)
    }
    fn exception(&mut self, _run_context: &mut C) -> HookResult {
        self.record(Hook::Exception)
    }
}
