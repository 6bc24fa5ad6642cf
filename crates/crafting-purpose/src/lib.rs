//! Tasks, purposes and reward shaping for the Crafting simulation.
//!
//! This crate turns world snapshots into rewards and episode termination.
//!
//! # Modules
//!
//! - [`error`] -- Error types for binding and building purposes.
//! - [`task`] -- [`Task`] goals (get item, go to zone, place item, custom)
//!   with a sticky ended flag.
//! - [`purpose`] -- [`Purpose`], its terminal groups and per-step reward.
//! - [`shaping`] -- Subtask synthesis for each [`RewardShaping`] strategy.

pub mod error;
pub mod purpose;
pub mod shaping;
pub mod task;

// Re-export primary types at crate root.
pub use error::PurposeError;
pub use purpose::{DEFAULT_GROUP, Purpose, RewardShaping, TerminalGroups};
pub use task::{CustomGoal, Goal, Task, TaskState};
