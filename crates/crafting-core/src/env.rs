//! The episode environment: one world state scored by one purpose.
//!
//! [`CraftingEnv::step`] runs the full per-step sequence: legality check,
//! atomic application, reward, terminal check, then truncation against
//! `max_steps`. An illegal transformation is reported as an error and leaves
//! the episode exactly as it was; it does not count as a step.

use std::collections::BTreeSet;
use std::sync::Arc;

use crafting_purpose::{Purpose, PurposeError};
use crafting_types::{Observation, Snapshot, TransformationId};
use crafting_world::{World, WorldError, WorldState};
use serde::Serialize;
use tracing::{debug, info};

/// Errors raised by the environment.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The world rejected the transformation.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The purpose could not be built for the world.
    #[error(transparent)]
    Purpose(#[from] PurposeError),

    /// `step` was called after the episode ended; call `reset` first.
    #[error("episode is over after {steps} steps")]
    EpisodeOver {
        /// Steps taken in the finished episode.
        steps: u64,
    },
}

/// Result of one applied transformation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// State after the transformation.
    pub snapshot: Snapshot,
    /// Reward for this step.
    pub reward: f64,
    /// The purpose is achieved.
    pub terminal: bool,
    /// `max_steps` was reached before the purpose.
    pub truncated: bool,
}

impl StepOutcome {
    /// Whether the episode is over, for either reason.
    pub const fn is_done(&self) -> bool {
        self.terminal || self.truncated
    }
}

/// A world state, the purpose scoring it, and the step counter.
#[derive(Debug)]
pub struct CraftingEnv {
    state: WorldState,
    purpose: Purpose,
    max_steps: Option<u64>,
    steps: u64,
    done: bool,
}

impl CraftingEnv {
    /// Create an environment; builds `purpose` against `world`.
    ///
    /// # Arguments
    ///
    /// * `world` - Shared immutable catalog the episodes run in
    /// * `purpose` - Tasks scoring each step; bound and shaped here
    /// * `max_steps` - Applied steps before truncation, `None` for no limit
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Purpose`] if the purpose does not fit the world.
    pub fn new(
        world: Arc<World>,
        mut purpose: Purpose,
        max_steps: Option<u64>,
    ) -> Result<Self, EnvError> {
        purpose.build(&world)?;
        info!(
            transformations = world.transformation_count(),
            purpose = %purpose,
            max_steps,
            "Environment ready"
        );
        Ok(Self {
            state: WorldState::new(world),
            purpose,
            max_steps,
            steps: 0,
            done: false,
        })
    }

    /// Start a new episode from the world's initial state.
    pub fn reset(&mut self) -> Snapshot {
        self.state.reset();
        self.purpose.reset();
        self.steps = 0;
        self.done = false;
        debug!("Episode reset");
        self.state.snapshot()
    }

    /// Apply one transformation and score the result.
    ///
    /// # Returns
    ///
    /// The [`StepOutcome`] with the new snapshot, the step reward and
    /// whether the episode ended by reaching the purpose or by truncation.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::World`] for an unknown or illegal transformation
    /// (nothing changes), and [`EnvError::EpisodeOver`] once the episode has
    /// ended.
    pub fn step(&mut self, id: TransformationId) -> Result<StepOutcome, EnvError> {
        if self.done {
            return Err(EnvError::EpisodeOver { steps: self.steps });
        }
        self.state.step(id)?;
        self.steps = self.steps.saturating_add(1);

        let snapshot = self.state.snapshot();
        let (reward, terminal) = self.purpose.evaluate(&snapshot);
        let truncated = !terminal && self.max_steps.is_some_and(|max| self.steps >= max);
        self.done = terminal || truncated;

        debug!(
            step = self.steps,
            transformation = %id,
            reward,
            terminal,
            truncated,
            "Step"
        );
        Ok(StepOutcome {
            snapshot,
            reward,
            terminal,
            truncated,
        })
    }

    /// Transformations legal in the current state.
    pub fn legal_actions(&self) -> BTreeSet<TransformationId> {
        self.state.legal_transformations()
    }

    /// What a decision source sees.
    pub fn observation(&self) -> Observation {
        self.state.observation()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Underlying world state.
    pub const fn state(&self) -> &WorldState {
        &self.state
    }

    /// The world being played.
    pub const fn world(&self) -> &Arc<World> {
        self.state.world()
    }

    /// The purpose scoring the episode.
    pub const fn purpose(&self) -> &Purpose {
        &self.purpose
    }

    /// Steps applied in this episode.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Step limit, if any.
    pub const fn max_steps(&self) -> Option<u64> {
        self.max_steps
    }

    /// Whether the episode has ended.
    pub const fn is_done(&self) -> bool {
        self.done
    }
}
