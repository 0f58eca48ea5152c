use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::{
    callback::{Callback, HookResult},
    run_context::RunContext,
};

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] [{bar:40.green/white}] {human_pos}/{human_len} {per_sec} ({eta}) {msg}";

/// Draws a progress bar over every step of the run, and prints the loss at the end of each epoch.
///
/// The bar's length is taken from [`RunContext::num_epochs`] and [`RunContext::steps_per_epoch`] when training begins,
/// and its position follows [`RunContext::global_step`].
pub struct TrainingProgress {
    pb: ProgressBar,
    should_log: bool,
}

impl TrainingProgress {
    /// Create a progress bar drawn on the terminal. If `should_log` is set, the epoch lines are also sent to the logger, so they survive when output is piped
    pub fn new(should_log: bool) -> Self {
        Self::with_bar(ProgressBar::new(0), should_log)
    }

    /// Create a progress tracker that never draws
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), false)
    }

    fn with_bar(pb: ProgressBar, should_log: bool) -> Self {
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        TrainingProgress { pb, should_log }
    }

    /// Consume the callback, returning the underlying progress bar
    pub fn into_inner(self) -> ProgressBar {
        self.pb
    }

    fn sync_position(&self, run_context: &RunContext) {
        self.pb.set_position(run_context.global_step as u64);
    }
}

impl Callback for TrainingProgress {
    fn train_begin(&mut self, run_context: &mut RunContext) -> HookResult {
        self.pb.set_length(run_context.total_steps() as u64);
        self.sync_position(run_context);
        Ok(())
    }

    fn train_step_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.sync_position(run_context);
        Ok(())
    }

    fn ds_sink_end(&mut self, run_context: &mut RunContext) -> HookResult {
        self.sync_position(run_context);
        Ok(())
    }

    fn train_epoch_end(&mut self, run_context: &mut RunContext) -> HookResult {
        let loss = run_context
            .loss
            .map_or_else(|| "n/a".to_string(), |loss| loss.to_string());
        let line = format!(
            "{} Epoch {}: Training Loss: {}",
            chrono::Local::now(),
            run_context.epoch,
            loss
        );
        self.pb.println(&line);
        if self.should_log {
            info!("{}", line);
        }
        Ok(())
    }

    fn train_end(&mut self, run_context: &mut RunContext) -> HookResult {
        if self.pb.is_finished() {
            return Ok(());
        }
        // finishing would jump the bar to full length, so a run that stopped early keeps its position
        if (run_context.global_step as u64) < self.pb.length().unwrap_or(0) {
            self.pb.abandon_with_message(format!(
                "Training stopped after {} of {} steps",
                run_context.global_step,
                run_context.total_steps()
            ));
        } else {
            self.pb.finish_with_message("Training complete");
        }
        Ok(())
    }

    fn exception(&mut self, run_context: &mut RunContext) -> HookResult {
        let reason = run_context.exception.as_deref().unwrap_or("unknown error");
        self.pb
            .abandon_with_message(format!("Training failed: {}", reason));
        Ok(())
    }

    fn name(&self) -> &str {
        "TrainingProgress"
    }
}
