mod util;
use util::{FailingCallback, StopAtStep, TestFailure};

use trainhook::{
    lifecycle_sequence, run_lifecycle, Callback, CallbackList, EarlyStopping, ExecutionMode, Hook,
    HookRecorder, LifecycleError, LifecycleOptions, LossMonitor, RunContext, TimeMonitor,
};

fn options(num_epochs: usize, steps_per_epoch: usize) -> LifecycleOptions {
    LifecycleOptions {
        num_epochs,
        steps_per_epoch,
        ..LifecycleOptions::default()
    }
}

fn boxed<T: Callback + 'static>(callback: T) -> Box<dyn Callback> {
    Box::new(callback)
}

/// replays a run, returning the hooks seen by a recorder registered after `callbacks`, and the run's result
fn replay_with(
    callbacks: Vec<Box<dyn Callback>>,
    ctx: &mut RunContext,
    options: &LifecycleOptions,
) -> (Vec<Hook>, Result<(), LifecycleError>) {
    let mut recorder = HookRecorder::new();
    let mut list = CallbackList::new();
    for callback in callbacks {
        list.push(callback);
    }
    list.push(&mut recorder);
    let result = run_lifecycle(&mut list, ctx, options);
    drop(list);
    (recorder.into_hooks(), result)
}

#[test]
fn single_epoch_single_step_order() {
    assert_eq!(
        lifecycle_sequence(&LifecycleOptions::default()).unwrap(),
        vec![
            Hook::TrainBegin,
            Hook::TrainEpochBegin,
            Hook::FetchDataBegin,
            Hook::FetchDataEnd,
            Hook::TrainStepBegin,
            Hook::BeforeOptimizerStep,
            Hook::AfterOptimizerStep,
            Hook::TrainStepEnd,
            Hook::TrainEpochEnd,
            Hook::TrainEnd,
        ]
    );
}

#[test]
fn every_step_of_every_epoch_is_reported() {
    let sequence = lifecycle_sequence(&options(3, 4)).unwrap();
    let count = |hook| sequence.iter().filter(|&&seen| seen == hook).count();
    assert_eq!(count(Hook::TrainEpochBegin), 3);
    assert_eq!(count(Hook::TrainEpochEnd), 3);
    assert_eq!(count(Hook::TrainStepBegin), 12);
    assert_eq!(count(Hook::AfterOptimizerStep), 12);
    assert_eq!(count(Hook::DsSinkBegin), 0);
    assert_eq!(sequence.len(), 2 + 3 * 2 + 12 * 6);
}

#[test]
fn sink_mode_replaces_step_hooks() {
    let options = LifecycleOptions {
        execution: ExecutionMode::Sink { sink_size: 4 },
        ..options(2, 10)
    };
    let sequence = lifecycle_sequence(&options).unwrap();
    let count = |hook| sequence.iter().filter(|&&seen| seen == hook).count();
    assert_eq!(count(Hook::DsSinkBegin), 6);
    assert_eq!(count(Hook::DsSinkEnd), 6);
    assert_eq!(count(Hook::FetchDataBegin), 6);
    assert_eq!(count(Hook::TrainStepBegin), 0);
    assert_eq!(count(Hook::BeforeOptimizerStep), 0);
    assert_eq!(
        &sequence[..7],
        &[
            Hook::TrainBegin,
            Hook::TrainEpochBegin,
            Hook::FetchDataBegin,
            Hook::FetchDataEnd,
            Hook::DsSinkBegin,
            Hook::DsSinkEnd,
            Hook::FetchDataBegin,
        ]
    );
}

#[test]
fn sink_mode_step_counter_points_at_chunk_end() {
    struct SinkSteps {
        steps: Vec<usize>,
    }
    impl Callback for SinkSteps {
        fn ds_sink_end(&mut self, run_context: &mut RunContext) -> trainhook::HookResult {
            self.steps.push(run_context.step);
            Ok(())
        }
    }
    let mut sink_steps = SinkSteps { steps: vec![] };
    let options = LifecycleOptions {
        execution: ExecutionMode::Sink { sink_size: 4 },
        ..options(1, 10)
    };
    run_lifecycle(
        &mut CallbackList::new().with(&mut sink_steps),
        &mut RunContext::default(),
        &options,
    )
    .unwrap();
    assert_eq!(sink_steps.steps, vec![4, 8, 10]);
}

#[test]
fn model_checkpoint_and_evaluation_placement() {
    let options = LifecycleOptions {
        evaluate_every: Some(1),
        checkpoint_every: Some(2),
        load_model: true,
        resume_from_checkpoint: true,
        save_model: true,
        ..options(2, 1)
    };
    let epoch = |extra: &[Hook]| {
        let mut hooks = vec![
            Hook::TrainEpochBegin,
            Hook::FetchDataBegin,
            Hook::FetchDataEnd,
            Hook::TrainStepBegin,
            Hook::BeforeOptimizerStep,
            Hook::AfterOptimizerStep,
            Hook::TrainStepEnd,
            Hook::TrainEpochEnd,
            Hook::EvaluateBegin,
            Hook::EvaluateEnd,
        ];
        hooks.extend_from_slice(extra);
        hooks
    };
    let mut expected = vec![Hook::LoadModel, Hook::LoadCheckpoint, Hook::TrainBegin];
    expected.extend(epoch(&[]));
    expected.extend(epoch(&[Hook::SaveCheckpoint]));
    expected.extend([Hook::SaveModel, Hook::TrainEnd]);
    assert_eq!(lifecycle_sequence(&options).unwrap(), expected);
}

#[test]
fn brackets_are_balanced() {
    for execution in [ExecutionMode::StepByStep, ExecutionMode::Sink { sink_size: 3 }] {
        let options = LifecycleOptions {
            execution,
            evaluate_every: Some(2),
            checkpoint_every: Some(3),
            save_model: true,
            ..options(5, 7)
        };
        let mut open: Vec<Hook> = Vec::new();
        for hook in lifecycle_sequence(&options).unwrap() {
            if hook.is_begin() {
                open.push(hook);
            } else if let Some(&last) = open.last() {
                if last.end_of() == Some(hook) {
                    open.pop();
                }
            }
        }
        assert!(open.is_empty(), "unclosed brackets: {:?}", open);
    }
}

#[test]
fn stop_request_ends_the_run_after_the_current_step() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(StopAtStep { at_global_step: 3 })];
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options(2, 5));
    result.unwrap();
    let count = |hook| hooks.iter().filter(|&&seen| seen == hook).count();
    assert_eq!(count(Hook::TrainStepEnd), 3);
    assert_eq!(count(Hook::TrainEpochBegin), 1);
    assert_eq!(count(Hook::TrainEpochEnd), 1);
    assert_eq!(&hooks[hooks.len() - 2..], &[Hook::TrainEpochEnd, Hook::TrainEnd]);
    assert_eq!(ctx.epoch, 1);
    assert_eq!(ctx.global_step, 3);
}

#[test]
fn stop_request_in_sink_mode() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(StopAtStep { at_global_step: 5 })];
    let options = LifecycleOptions {
        execution: ExecutionMode::Sink { sink_size: 4 },
        ..options(3, 12)
    };
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options);
    result.unwrap();
    assert_eq!(hooks.iter().filter(|&&hook| hook == Hook::DsSinkEnd).count(), 2);
    assert_eq!(ctx.global_step, 8);
}

#[test_log::test]
fn early_stopping_ends_the_run_between_epochs() {
    struct Plateau;
    impl Callback for Plateau {
        fn train_epoch_end(&mut self, run_context: &mut RunContext) -> trainhook::HookResult {
            run_context.loss = Some(if run_context.epoch == 1 { 1.0 } else { 2.0 });
            Ok(())
        }
    }
    let mut ctx = RunContext::default();
    let callbacks = vec![
        boxed(Plateau),
        boxed(EarlyStopping::new(2, 0.0)),
        boxed(TimeMonitor::new()),
        boxed(LossMonitor::new(1)),
    ];
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options(10, 2));
    result.unwrap();
    assert_eq!(hooks.iter().filter(|&&hook| hook == Hook::TrainEpochEnd).count(), 3);
    assert_eq!(ctx.epoch, 3);
    assert!(ctx.stop_requested());
    assert!(ctx.metric(trainhook::callbacks::EPOCH_TIME_METRIC).is_some());
}

#[test_log::test]
fn failure_notifies_exception_then_closes_the_run() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(FailingCallback {
        hook: Hook::TrainStepBegin,
        after_global_step: 2,
        message: "out of memory",
    })];
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options(2, 3));

    let Err(LifecycleError::Callback(error)) = result else {
        panic!("expected a callback failure, got {:?}", result);
    };
    assert_eq!(error.hook, Hook::TrainStepBegin);
    assert_eq!(error.index, 0);
    assert_eq!(
        error.source.downcast_ref::<TestFailure>(),
        Some(&TestFailure("out of memory"))
    );
    // the failing callback is registered first, so the recorder never sees the failing hook
    assert_eq!(
        &hooks[hooks.len() - 5..],
        &[
            Hook::TrainStepEnd,
            Hook::FetchDataBegin,
            Hook::FetchDataEnd,
            Hook::Exception,
            Hook::TrainEnd
        ]
    );
    assert_eq!(ctx.global_step, 2);
    assert!(ctx.exception.as_deref().unwrap().contains("out of memory"));
}

#[test]
fn failure_before_train_begin_skips_train_end() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(FailingCallback::new(Hook::LoadModel, "no such file"))];
    let options = LifecycleOptions {
        load_model: true,
        ..options(1, 1)
    };
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options);
    assert!(matches!(result, Err(LifecycleError::Callback(_))));
    assert_eq!(hooks, vec![Hook::Exception]);
}

#[test]
fn failure_in_train_end_is_not_retried() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(FailingCallback::new(Hook::TrainEnd, "flush failed"))];
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options(1, 1));
    assert!(matches!(result, Err(LifecycleError::Callback(ref e)) if e.hook == Hook::TrainEnd));
    assert_eq!(&hooks[hooks.len() - 2..], &[Hook::TrainEpochEnd, Hook::Exception]);
}

#[test]
fn failing_checkpoint_still_reaches_train_end() {
    let mut ctx = RunContext::default();
    let callbacks = vec![boxed(FailingCallback::new(
        Hook::SaveCheckpoint,
        "read-only filesystem",
    ))];
    let options = LifecycleOptions {
        checkpoint_every: Some(1),
        ..options(3, 1)
    };
    let (hooks, result) = replay_with(callbacks, &mut ctx, &options);
    assert!(result.is_err());
    assert_eq!(hooks.iter().filter(|&&hook| hook == Hook::TrainEpochEnd).count(), 1);
    assert_eq!(&hooks[hooks.len() - 2..], &[Hook::Exception, Hook::TrainEnd]);
}
