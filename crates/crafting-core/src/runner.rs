//! Episode loop runner.
//!
//! This module provides [`run_episode`], which drives one episode of a
//! [`CraftingEnv`] with a [`DecisionSource`]:
//!
//! - **Purpose achieved**: some terminal group has all its tasks ended
//! - **Step limit**: the environment truncated the episode at `max_steps`
//! - **No decision**: the source made no input (no legal action, plan over)
//!
//! A [`StepCallback`] is notified after every applied step, for renderers,
//! recorders and other observers.

use serde::Serialize;
use tracing::{info, warn};

use crate::decision::DecisionSource;
use crate::env::{CraftingEnv, EnvError, StepOutcome};

/// Errors that can occur during an episode.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed.
    #[error("step error: {source}")]
    Env {
        /// The underlying environment error.
        #[from]
        source: EnvError,
    },
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEndReason {
    /// A terminal group was completed.
    PurposeAchieved,
    /// `max_steps` was reached first.
    MaxStepsReached,
    /// The decision source returned no transformation.
    NoDecision,
}

impl core::fmt::Display for EpisodeEndReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::PurposeAchieved => "purpose_achieved",
            Self::MaxStepsReached => "max_steps_reached",
            Self::NoDecision => "no_decision",
        })
    }
}

/// Result of one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeResult {
    /// The reason the episode ended.
    pub end_reason: EpisodeEndReason,
    /// Number of steps applied.
    pub steps: u64,
    /// Sum of step rewards.
    pub total_reward: f64,
}

/// Callback invoked after each applied step.
pub trait StepCallback {
    /// Called with the outcome of the step and the environment after it.
    fn on_step(&mut self, outcome: &StepOutcome, env: &CraftingEnv);
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _outcome: &StepOutcome, _env: &CraftingEnv) {}
}

/// Run one episode from a fresh reset until it ends.
///
/// The episode stops when the purpose is achieved, when `max_steps` is
/// reached, or when the decision source has nothing to offer.
///
/// # Arguments
///
/// * `env` - Environment to drive; reset before the first step
/// * `source` - Source of transformation choices (random, scripted, etc.)
/// * `callback` - Called after each applied step
///
/// # Returns
///
/// Returns an [`EpisodeResult`] describing why the episode ended, the
/// number of steps taken and the accumulated reward.
///
/// # Errors
///
/// Returns [`RunnerError::Env`] if the source picks an illegal or unknown
/// transformation.
pub fn run_episode(
    env: &mut CraftingEnv,
    source: &mut dyn DecisionSource,
    callback: &mut dyn StepCallback,
) -> Result<EpisodeResult, RunnerError> {
    env.reset();
    let mut total_reward = 0.0;

    info!(max_steps = env.max_steps(), purpose = %env.purpose(), "Episode starting");

    let end_reason = loop {
        let Some(id) = source.choose(&env.observation()) else {
            break EpisodeEndReason::NoDecision;
        };
        let outcome = env.step(id)?;
        total_reward += outcome.reward;
        callback.on_step(&outcome, env);

        if outcome.terminal {
            break EpisodeEndReason::PurposeAchieved;
        }
        if outcome.truncated {
            break EpisodeEndReason::MaxStepsReached;
        }
    };

    Ok(EpisodeResult {
        end_reason,
        steps: env.steps(),
        total_reward,
    })
}

/// Log the outcome of an episode.
pub fn log_episode_end(episode: u32, result: &EpisodeResult) {
    if result.end_reason == EpisodeEndReason::PurposeAchieved {
        info!(
            episode,
            reason = %result.end_reason,
            steps = result.steps,
            total_reward = result.total_reward,
            "Episode ended"
        );
    } else {
        warn!(
            episode,
            reason = %result.end_reason,
            steps = result.steps,
            total_reward = result.total_reward,
            "Episode ended without reaching the purpose"
        );
    }
}
