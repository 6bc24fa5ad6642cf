//! Episode runner binary for the Crafting simulation.
//!
//! This is the main entry point that wires together the configured world,
//! the purpose and a seeded random decision source, then runs the
//! configured number of episodes.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `crafting-config.yaml` (or `CRAFTING_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the world from its preset
//! 4. Assemble the purpose and the environment
//! 5. Run the episodes
//! 6. Log the results

mod error;
mod step_logger;

use std::sync::Arc;

use crafting_core::config::{CraftingConfig, LoggingConfig};
use crafting_core::decision::RandomDecisionSource;
use crafting_core::env::CraftingEnv;
use crafting_core::runner::{self, EpisodeEndReason};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::step_logger::StepLogger;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, setup or an episode fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = CraftingConfig::load().map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        preset = ?config.world.preset,
        seed = config.world.seed,
        episodes = config.episode.episodes,
        max_steps = config.episode.max_steps,
        "crafting-engine starting"
    );

    // 3. Build the world.
    let world = Arc::new(config.world.build().map_err(EngineError::from)?);

    // 4. Assemble purpose and environment.
    let purpose = config
        .purpose
        .assemble(config.world.default_task(&world))
        .map_err(EngineError::from)?;
    let mut env = CraftingEnv::new(Arc::clone(&world), purpose, config.episode.max_steps)
        .map_err(EngineError::from)?;

    // 5. Run the episodes.
    let mut source = RandomDecisionSource::new(config.episode.decision_seed);
    let mut logger = StepLogger::default();
    let mut achieved: u32 = 0;
    for episode in 0..config.episode.episodes {
        let result =
            runner::run_episode(&mut env, &mut source, &mut logger).map_err(EngineError::from)?;
        runner::log_episode_end(episode, &result);
        info!(
            episode,
            rewarded_steps = logger.take_rewarded_steps(),
            "Episode summary"
        );
        if result.end_reason == EpisodeEndReason::PurposeAchieved {
            achieved = achieved.saturating_add(1);
        }
    }

    // 6. Log results.
    info!(
        episodes = config.episode.episodes,
        achieved,
        "crafting-engine shutdown complete"
    );

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}
