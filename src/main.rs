use std::{error::Error, fs::File, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use strum::IntoEnumIterator;

use trainhook::{
    lifecycle_sequence, run_lifecycle, CallbackList, ExecutionMode, Hook, HookRecorder,
    LifecycleOptions, LossMonitor, RunContext, TimeMonitor, TrainingProgress,
};

/// A small CLI for inspecting the order in which a training loop calls its lifecycle hooks.
#[derive(Parser, Debug, Clone)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// send info-level logs to stderr in addition to the regular output
    #[arg(long, default_value = "false", global = true)]
    log_output: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the hooks a run would call, in order
    Sequence {
        #[command(flatten)]
        run: RunArgs,

        /// print the sequence as a JSON array instead of one hook per line
        #[arg(long)]
        json: bool,
    },
    /// Replay a run through the stock callbacks and report how often each hook was called
    Replay {
        #[command(flatten)]
        run: RunArgs,

        /// draw a progress bar while replaying
        #[arg(long)]
        progress: bool,
    },
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    /// path to a JSON file containing the run options. When set, the other run options are ignored
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(short = 'e', long, visible_alias = "epochs", default_value = "1")]
    /// number of epochs in the run
    num_epochs: usize,

    #[arg(short = 's', long = "steps", default_value = "1")]
    /// number of steps in each epoch
    steps_per_epoch: usize,

    #[arg(long)]
    /// if set, steps are executed in sunk chunks of this many steps instead of one at a time
    sink_size: Option<usize>,

    #[arg(long)]
    /// run an evaluation pass after every N epochs
    evaluate_every: Option<usize>,

    #[arg(long)]
    /// save a checkpoint after every N epochs
    checkpoint_every: Option<usize>,

    #[arg(long)]
    /// load a model before training begins
    load_model: bool,

    #[arg(long = "resume")]
    /// load a checkpoint before training begins
    resume_from_checkpoint: bool,

    #[arg(long)]
    /// save the model once training is complete
    save_model: bool,
}

impl RunArgs {
    fn lifecycle_options(&self) -> Result<LifecycleOptions, Box<dyn Error>> {
        if let Some(config_path) = &self.config {
            return load_options(config_path);
        }
        let execution = match self.sink_size {
            Some(sink_size) => ExecutionMode::Sink { sink_size },
            None => ExecutionMode::StepByStep,
        };
        Ok(LifecycleOptions::new(
            self.num_epochs,
            self.steps_per_epoch,
            execution,
            self.evaluate_every,
            self.checkpoint_every,
            self.load_model,
            self.resume_from_checkpoint,
            self.save_model,
        )?)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.log_output { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::debug!("Using arguments {cli:?}");

    match cli.command {
        Commands::Sequence { run, json } => {
            let sequence = lifecycle_sequence(&run.lifecycle_options()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sequence)?);
            } else {
                for hook in sequence {
                    println!("{}", hook);
                }
            }
            Ok(())
        }
        Commands::Replay { run, progress } => {
            let options = run.lifecycle_options()?;
            let mut recorder = HookRecorder::new();
            let mut run_context = RunContext::default();
            {
                let mut callbacks = CallbackList::new()
                    .with(LossMonitor::default())
                    .with(TimeMonitor::new());
                if progress {
                    callbacks.push(TrainingProgress::new(cli.log_output));
                }
                callbacks.push(&mut recorder);
                run_lifecycle(&mut callbacks, &mut run_context, &options)?;
            }
            println!("{}", format_hook_counts(&recorder));
            println!("Final context: {}", serde_json::to_string(&run_context)?);
            Ok(())
        }
    }
}

/// panic-free loading of run options from a JSON file. The options are validated before being returned
fn load_options(config_path: &PathBuf) -> Result<LifecycleOptions, Box<dyn Error>> {
    log::info!("Loading run options from file: {:?}", config_path);
    let file = File::open(config_path)?;
    let options: LifecycleOptions = serde_json::from_reader(file)?;
    options.validate()?;
    Ok(options)
}

/// one line per hook that was called at least once, in declaration order
fn format_hook_counts(recorder: &HookRecorder) -> String {
    Hook::iter()
        .filter_map(|hook| match recorder.count(hook) {
            0 => None,
            count => Some(format!("{:<24}{}", hook.to_string(), count)),
        })
        .collect::<Vec<String>>()
        .join("\n")
}
