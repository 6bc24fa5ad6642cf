//! Error types for the `crafting-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias. None of them leave an inventory partially
//! updated: a rejected step leaves the world state untouched.

use crafting_types::{Item, TransformationId, Zone};

use crate::requirements::Node;
use crate::transformation::LegalityViolation;

/// Errors that can occur while building or stepping a crafting world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The transformation exists but its preconditions do not hold.
    #[error("illegal transformation {id}: {violation}")]
    IllegalTransformation {
        /// The rejected transformation.
        id: TransformationId,
        /// Which precondition failed.
        violation: LegalityViolation,
    },

    /// A transformation identifier outside the world catalog.
    #[error("unknown transformation: {0}")]
    UnknownTransformation(TransformationId),

    /// An item that no transformation of the world mentions.
    #[error("unknown item: {0}")]
    UnknownItem(Item),

    /// A zone that no transformation of the world mentions.
    #[error("unknown zone: {0}")]
    UnknownZone(Zone),

    /// An `add` or `remove` stack with a quantity of zero.
    #[error("transformation {transformation} uses a zero quantity of {item}")]
    ZeroQuantity {
        /// Display name of the offending transformation.
        transformation: String,
        /// The zero-quantity item.
        item: Item,
    },

    /// Destination inventory changes declared on a transformation that does
    /// not move the player.
    #[error("transformation {transformation} changes the destination inventory but has no destination")]
    DestinationWithoutMove {
        /// Display name of the offending transformation.
        transformation: String,
    },

    /// Zone inventories are used but the world has no zone at all.
    #[error("transformation {transformation} changes a zone inventory but the world has no zone")]
    MissingZone {
        /// Display name of the offending transformation.
        transformation: String,
    },

    /// An inventory count would exceed `u32::MAX`.
    #[error("quantity overflow for {item}")]
    QuantityOverflow {
        /// The item whose count overflowed.
        item: Item,
    },

    /// More units of an item were removed than the inventory holds.
    #[error("insufficient quantity of {item}: held {held}, requested {requested}")]
    InsufficientQuantity {
        /// The item being removed.
        item: Item,
        /// Units held.
        held: u32,
        /// Units requested.
        requested: u32,
    },

    /// The requirements graph contains a dependency cycle.
    #[error("requirements cycle through {}", display_cycle(.cycle))]
    RequirementsCycle {
        /// Nodes along the cycle, first node repeated at the end.
        cycle: Vec<Node>,
    },
}

fn display_cycle(cycle: &[Node]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
