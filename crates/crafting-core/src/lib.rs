//! Episode environment, decision sources and configuration for the Crafting
//! simulation.
//!
//! This crate owns the step loop that drives an episode:
//! decision, legality check, application, reward and termination.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `crafting-config.yaml` into
//!   strongly-typed structs, and world/purpose builders.
//! - [`decision`] -- [`DecisionSource`] trait, [`RandomDecisionSource`] and
//!   [`ScriptedDecisionSource`].
//! - [`env`] -- [`CraftingEnv`]: reset, step, truncation.
//! - [`runner`] -- [`run_episode`] and episode end reasons.
//!
//! [`DecisionSource`]: decision::DecisionSource
//! [`RandomDecisionSource`]: decision::RandomDecisionSource
//! [`ScriptedDecisionSource`]: decision::ScriptedDecisionSource
//! [`CraftingEnv`]: env::CraftingEnv
//! [`run_episode`]: runner::run_episode

pub mod config;
pub mod decision;
pub mod env;
pub mod runner;
