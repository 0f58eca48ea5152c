// each integration test target uses a different subset of these helpers
#![allow(dead_code)]

use trainhook::{Callback, Hook, HookResult, RunContext};

/// The error returned by [`FailingCallback`]
#[derive(Debug, Clone, PartialEq)]
pub struct TestFailure(pub &'static str);

impl std::fmt::Display for TestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "test failure: {}", self.0)
    }
}

impl std::error::Error for TestFailure {}

/// Fails with a [`TestFailure`] the first time `hook` is called once `after_global_step` steps have started
pub struct FailingCallback {
    pub hook: Hook,
    pub after_global_step: usize,
    pub message: &'static str,
}

impl FailingCallback {
    pub fn new(hook: Hook, message: &'static str) -> Self {
        FailingCallback {
            hook,
            after_global_step: 0,
            message,
        }
    }

    fn maybe_fail(&self, hook: Hook, run_context: &RunContext) -> HookResult {
        if hook == self.hook && run_context.global_step >= self.after_global_step {
            return Err(Box::new(TestFailure(self.message)));
        }
        Ok(())
    }
}

impl Callback for FailingCallback {
    fn load_model(&mut self, run_context: &mut RunContext) -> HookResult {
        self.maybe_fail(Hook::LoadModel, run_context)
    }
    fn train_step_begin(&mut self, run_context: &mut RunContext) -> HookResult {
        self.maybe_fail(Hook::TrainStepBegin, run_context)
    }
    fn save_checkpoint(&mut self, run_context: &mut RunContext) -> HookResult {
        self.maybe_fail(Hook::SaveCheckpoint, run_context)
    }
    fn train_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.maybe_fail(Hook::TrainEnd, run_context)
    }
    fn name(&self) -> &str {
        "FailingCallback"
    }
}

/// Requests a stop at the end of the step where the global step reaches `at_global_step`
pub struct StopAtStep {
    pub at_global_step: usize,
}

impl Callback for StopAtStep {
    fn train_step_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.check(run_context)
    }
    fn ds_sink_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.check(run_context)
    }
}

impl StopAtStep {
    fn check(&self, run_context: &mut RunContext) -> HookResult {
        if run_context.global_step >= self.at_global_step {
            run_context.request_stop();
        }
        Ok(())
    }
}
