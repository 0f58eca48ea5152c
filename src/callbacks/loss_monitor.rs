use std::fmt;

use log::info;

use crate::{
    callback::{Callback, HookResult},
    run_context::RunContext,
};

/// Logs the training loss every `interval` steps, and fails the run if the loss stops being a finite number.
///
/// The loss is read from [`RunContext::loss`] at the end of each step, or each data sink in sink mode.
/// Steps for which the host has not reported a loss are ignored.
#[derive(Clone, Debug)]
pub struct LossMonitor {
    interval: usize,
    last_logged_step: usize,
}

impl LossMonitor {
    /// Create a monitor that logs every `interval` steps. An interval of 0 is treated as 1
    pub fn new(interval: usize) -> Self {
        LossMonitor {
            interval: interval.max(1),
            last_logged_step: 0,
        }
    }

    fn check(&mut self, run_context: &RunContext) -> HookResult {
        let Some(loss) = run_context.loss else {
            return Ok(());
        };
        if !loss.is_finite() {
            return Err(Box::new(InvalidLoss {
                epoch: run_context.epoch,
                step: run_context.step,
                loss,
            }));
        }
        // in sink mode the global step advances a chunk at a time, so compare against the last step logged
        if run_context.global_step >= self.last_logged_step + self.interval {
            info!(
                "epoch {} step {}: loss = {}",
                run_context.epoch, run_context.step, loss
            );
            self.last_logged_step = run_context.global_step;
        }
        Ok(())
    }
}

impl Default for LossMonitor {
    /// Logs every step
    fn default() -> Self {
        LossMonitor::new(1)
    }
}

impl Callback for LossMonitor {
    fn train_begin(&mut self, _run_context: &mut RunContext) -> HookResult {
        self.last_logged_step = 0;
        Ok(())
    }

    fn train_step_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.check(run_context)
    }

    fn ds_sink_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.check(run_context)
    }

    fn name(&self) -> &str {
        "LossMonitor"
    }
}

/// Returned by [`LossMonitor`] when the reported loss is NaN or infinite
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct InvalidLoss {
    /// The epoch in which the loss was reported
    pub epoch: usize,
    /// The step within the epoch at which the loss was reported
    pub step: usize,
    /// The loss reported
    pub loss: f64,
}

impl fmt::Display for InvalidLoss {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "epoch {} step {} reported a non-finite loss ({}), training can't continue",
            self.epoch, self.step, self.loss
        )
    }
}

impl std::error::Error for InvalidLoss {}
