use log::info;

use crate::{
    callback::{Callback, HookResult},
    run_context::RunContext,
};

/// Requests a stop when the monitored value hasn't improved for `patience` consecutive checks.
///
/// By default the training loss is checked at the end of each epoch.
/// With [`EarlyStopping::monitor`], the named metric is checked at the end of each evaluation instead,
/// which suits metrics written by an evaluation pass (such as a validation loss).
/// Lower values are better. Checks for which no value has been reported are skipped.
///
/// # Example
/// ```
/// use trainhook::EarlyStopping;
///
/// // stop if the validation loss hasn't improved by more than 0.001 for 5 evaluations
/// let early_stop = EarlyStopping::new(5, 0.001).monitor("val_loss");
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f64,
    monitor: Option<String>,
    best: f64,
    checks_without_improvement: usize,
}

impl EarlyStopping {
    /// Create an early stopping callback watching the training loss.
    ///
    /// A value counts as an improvement if it is lower than the best value seen by more than `min_delta`.
    pub fn new(patience: usize, min_delta: f64) -> Self {
        EarlyStopping {
            patience,
            min_delta,
            monitor: None,
            best: f64::INFINITY,
            checks_without_improvement: 0,
        }
    }

    /// Watch the named metric, checked after each evaluation, instead of the training loss
    pub fn monitor(mut self, metric: impl Into<String>) -> Self {
        self.monitor = Some(metric.into());
        self
    }

    /// the best value seen so far. Infinite if nothing has been checked yet
    pub fn best(&self) -> f64 {
        self.best
    }

    fn reset(&mut self) {
        self.best = f64::INFINITY;
        self.checks_without_improvement = 0;
    }

    fn check(&mut self, value: Option<f64>, run_context: &mut RunContext) {
        let Some(value) = value else {
            return;
        };
        if value < self.best - self.min_delta {
            self.best = value;
            self.checks_without_improvement = 0;
            return;
        }
        self.checks_without_improvement += 1;
        if self.checks_without_improvement >= self.patience {
            info!(
                "no improvement on {} for {} checks (best {}), requesting stop after epoch {}",
                self.monitor.as_deref().unwrap_or("loss"),
                self.checks_without_improvement,
                self.best,
                run_context.epoch
            );
            run_context.request_stop();
        }
    }
}

impl Callback for EarlyStopping {
    fn train_begin(&mut self, _run_context: &mut RunContext) -> HookResult {
        self.reset();
        Ok(())
    }

    fn train_epoch_end(&mut self, run_context: &mut RunContext) -> HookResult {
        if self.monitor.is_none() {
            let loss = run_context.loss;
            self.check(loss, run_context);
        }
        Ok(())
    }

    fn evaluate_end(&mut self, run_context: &mut RunContext) -> HookResult {
        if let Some(metric) = &self.monitor {
            let value = run_context.metric(metric);
            self.check(value, run_context);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "EarlyStopping"
    }
}
