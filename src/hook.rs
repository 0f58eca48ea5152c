use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::callback::{Callback, HookResult};

/// Names one of the hook points of the [`Callback`] trait.
///
/// Variants are declared in the same order as the trait's methods. `Display` and `FromStr` use the snake_case method name, so `Hook::TrainStepEnd.to_string() == "train_step_end"`.
///
/// ```
/// use std::str::FromStr;
/// use strum::{EnumCount, IntoEnumIterator};
/// use trainhook::Hook;
///
/// assert_eq!(Hook::COUNT, 19);
/// assert_eq!(Hook::iter().next(), Some(Hook::TrainBegin));
/// assert_eq!(Hook::from_str("ds_sink_end").unwrap(), Hook::DsSinkEnd);
/// ```
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    /// [`Callback::train_begin`]
    TrainBegin,
    /// [`Callback::train_end`]
    TrainEnd,
    /// [`Callback::train_epoch_begin`]
    TrainEpochBegin,
    /// [`Callback::train_epoch_end`]
    TrainEpochEnd,
    /// [`Callback::fetch_data_begin`]
    FetchDataBegin,
    /// [`Callback::fetch_data_end`]
    FetchDataEnd,
    /// [`Callback::train_step_begin`]
    TrainStepBegin,
    /// [`Callback::train_step_end`]
    TrainStepEnd,
    /// [`Callback::ds_sink_begin`]
    DsSinkBegin,
    /// [`Callback::ds_sink_end`]
    DsSinkEnd,
    /// [`Callback::load_model`]
    LoadModel,
    /// [`Callback::save_model`]
    SaveModel,
    /// [`Callback::load_checkpoint`]
    LoadCheckpoint,
    /// [`Callback::save_checkpoint`]
    SaveCheckpoint,
    /// [`Callback::evaluate_begin`]
    EvaluateBegin,
    /// [`Callback::evaluate_end`]
    EvaluateEnd,
    /// [`Callback::before_optimizer_step`]
    BeforeOptimizerStep,
    /// [`Callback::after_optimizer_step`]
    AfterOptimizerStep,
    /// [`Callback::exception`]
    Exception,
}

impl Hook {
    /// Call the method of `callback` named by this hook.
    ///
    /// # Errors
    /// Returns whatever error the callback's hook returns, unmodified.
    pub fn invoke<C, B>(self, callback: &mut B, run_context: &mut C) -> HookResult
    where
        C: ?Sized,
        B: Callback<C> + ?Sized,
    {
        match self {
            Hook::TrainBegin => callback.train_begin(run_context),
            Hook::TrainEnd => callback.train_end(run_context),
            Hook::TrainEpochBegin => callback.train_epoch_begin(run_context),
            Hook::TrainEpochEnd => callback.train_epoch_end(run_context),
            Hook::FetchDataBegin => callback.fetch_data_begin(run_context),
            Hook::FetchDataEnd => callback.fetch_data_end(run_context),
            Hook::TrainStepBegin => callback.train_step_begin(run_context),
            Hook::TrainStepEnd => callback.train_step_end(run_context),
            Hook::DsSinkBegin => callback.ds_sink_begin(run_context),
            Hook::DsSinkEnd => callback.ds_sink_end(run_context),
            Hook::LoadModel => callback.load_model(run_context),
            Hook::SaveModel => callback.save_model(run_context),
            Hook::LoadCheckpoint => callback.load_checkpoint(run_context),
            Hook::SaveCheckpoint => callback.save_checkpoint(run_context),
            Hook::EvaluateBegin => callback.evaluate_begin(run_context),
            Hook::EvaluateEnd => callback.evaluate_end(run_context),
            Hook::BeforeOptimizerStep => callback.before_optimizer_step(run_context),
            Hook::AfterOptimizerStep => callback.after_optimizer_step(run_context),
            Hook::Exception => callback.exception(run_context),
        }
    }

    /// Returns the hook that closes the bracket opened by this one, or `None` if this hook does not open a bracket.
    ///
    /// `before_optimizer_step`/`after_optimizer_step` count as a bracket around the optimizer update.
    pub fn end_of(self) -> Option<Hook> {
        match self {
            Hook::TrainBegin => Some(Hook::TrainEnd),
            Hook::TrainEpochBegin => Some(Hook::TrainEpochEnd),
            Hook::FetchDataBegin => Some(Hook::FetchDataEnd),
            Hook::TrainStepBegin => Some(Hook::TrainStepEnd),
            Hook::DsSinkBegin => Some(Hook::DsSinkEnd),
            Hook::EvaluateBegin => Some(Hook::EvaluateEnd),
            Hook::BeforeOptimizerStep => Some(Hook::AfterOptimizerStep),
            _ => None,
        }
    }

    /// true if this hook opens a bracket closed by another hook. See [`Hook::end_of`]
    pub fn is_begin(self) -> bool {
        self.end_of().is_some()
    }
}
