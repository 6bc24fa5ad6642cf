//! Transformations, inventories and world state for the Crafting simulation.
//!
//! This crate models the rules of a crafting world: what the player and each
//! zone hold, which transformations are legal, what applying them changes,
//! and which elements are needed to obtain which others.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world construction and stepping.
//! - [`inventory`] -- Checked item counts for the player and for zones.
//! - [`transformation`] -- [`Transformation`] builder, legality checks and
//!   atomic application.
//! - [`world`] -- The immutable [`World`] catalog built from transformations.
//! - [`state`] -- [`WorldState`], the only mutable part of an episode.
//! - [`requirements`] -- The [`RequirementsGraph`] over items, zones and zone
//!   items.
//! - [`presets`] -- Ready-made worlds (wood house, unlock pickup).
//! - [`random_world`] -- Seeded procedural crafting trees.

pub mod error;
pub mod inventory;
pub mod presets;
pub mod random_world;
pub mod requirements;
pub mod state;
pub mod transformation;
pub mod world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use inventory::Inventory;
pub use random_world::{RandomWorldConfig, random_world};
pub use requirements::{Node, NodeKind, RequirementsGraph};
pub use state::WorldState;
pub use transformation::{
    InventoryChanges, InventoryOwner, InventoryTarget, LegalityViolation, Transformation,
};
pub use world::World;
