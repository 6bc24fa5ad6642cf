//! Step callback that traces episode progress.
//!
//! Every step is logged at `debug` with the legal-action count of the new
//! state; rewarded steps are counted so the engine can report them per
//! episode.

use crafting_core::env::{CraftingEnv, StepOutcome};
use crafting_core::runner::StepCallback;
use crafting_types::Zone;
use tracing::debug;

/// Callback that logs each step and counts rewarded ones.
#[derive(Debug, Default)]
pub struct StepLogger {
    rewarded_steps: u64,
}

impl StepLogger {
    /// Rewarded steps since the last call; resets the counter.
    pub const fn take_rewarded_steps(&mut self) -> u64 {
        let count = self.rewarded_steps;
        self.rewarded_steps = 0;
        count
    }
}

impl StepCallback for StepLogger {
    fn on_step(&mut self, outcome: &StepOutcome, env: &CraftingEnv) {
        if outcome.reward > 0.0 {
            self.rewarded_steps = self.rewarded_steps.saturating_add(1);
        }
        debug!(
            step = env.steps(),
            reward = outcome.reward,
            legal_actions = env.legal_actions().len(),
            zone = env.state().current_zone().map(Zone::name),
            "Step applied"
        );
    }
}
