//! Read-only numeric views of the world state.
//!
//! A [`Snapshot`] is what the goal layer scores and what any policy or
//! renderer sees. All vectors are indexed by the world's catalog order
//! (items, zones and zone items sorted by name at construction time), so
//! two worlds built from the same transformations always produce
//! comparable snapshots.

use serde::{Deserialize, Serialize};

use crate::ids::TransformationId;

/// Inventories and position at one point of an episode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Quantity of each world item held by the player.
    pub player_inventory: Vec<u32>,
    /// Index of the zone the player stands in, if the world has zones.
    pub current_zone: Option<usize>,
    /// One row per zone, one column per zone item.
    pub zones_inventories: Vec<Vec<u32>>,
}

impl Snapshot {
    /// Quantity of the item at `item_index` held by the player.
    pub fn player_quantity(&self, item_index: usize) -> u32 {
        self.player_inventory.get(item_index).copied().unwrap_or(0)
    }

    /// Quantity of the zone item at `zone_item_index` lying in zone `zone_index`.
    pub fn zone_quantity(&self, zone_index: usize, zone_item_index: usize) -> u32 {
        self.zones_inventories
            .get(zone_index)
            .and_then(|row| row.get(zone_item_index))
            .copied()
            .unwrap_or(0)
    }

    /// Position as a one-hot vector over zones.
    pub fn position_one_hot(&self) -> Vec<u8> {
        (0..self.zones_inventories.len())
            .map(|index| u8::from(self.current_zone == Some(index)))
            .collect()
    }
}

/// Everything a decision source needs to pick the next transformation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Current inventories and position.
    pub snapshot: Snapshot,
    /// Legality of every transformation, indexed by [`TransformationId`].
    pub legal_actions: Vec<bool>,
}

impl Observation {
    /// Iterate over the identifiers of currently legal transformations.
    pub fn legal_ids(&self) -> impl Iterator<Item = TransformationId> + '_ {
        self.legal_actions
            .iter()
            .enumerate()
            .filter(|(_, legal)| **legal)
            .map(|(index, _)| TransformationId::new(index))
    }

    /// Whether the given transformation is currently legal.
    pub fn is_legal(&self, id: TransformationId) -> bool {
        self.legal_actions.get(id.index()).copied().unwrap_or(false)
    }
}
