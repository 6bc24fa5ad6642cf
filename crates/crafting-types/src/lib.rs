//! Shared type definitions for the Crafting simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the world, the goal layer and any external driver (renderer,
//! policy, planner).
//!
//! # Modules
//!
//! - [`elements`] -- Identity types: [`Item`], [`Zone`], [`ItemStack`]
//! - [`ids`] -- Index wrappers for transformations and tasks
//! - [`observation`] -- Numeric [`Snapshot`] and [`Observation`] payloads

pub mod elements;
pub mod ids;
pub mod observation;

// Re-export all public types at crate root for convenience.
pub use elements::{Item, ItemStack, Zone};
pub use ids::{TaskId, TransformationId};
pub use observation::{Observation, Snapshot};
