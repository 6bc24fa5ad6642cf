//! Transformations: the atomic, rule-based changes of a crafting world.
//!
//! A [`Transformation`] covers recipes, searching, placing items in a zone
//! and moving between zones. It has three kinds of preconditions, checked in
//! this order:
//!
//! 1. zone restriction -- the player stands in one of `zones` (if set),
//! 2. `remove` stacks -- every targeted inventory holds at least the total
//!    removed quantity of each item,
//! 3. `max` stacks -- every targeted inventory holds at most the cap.
//!
//! Applying a legal transformation removes, then adds, then moves the player
//! to the destination. Changes addressed to the destination inventory land
//! in the destination zone. Application is atomic: every touched inventory is
//! staged, and nothing is written back unless all changes succeed.

use std::collections::{BTreeMap, BTreeSet};

use crafting_types::{Item, ItemStack, TransformationId, Zone};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::inventory::Inventory;
use crate::state::WorldState;

/// Whose inventory an [`InventoryChanges`] record addresses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryOwner {
    /// The player's own inventory.
    Player,
    /// The inventory of the zone the player stands in before the move.
    CurrentZone,
    /// The inventory of the transformation's destination zone.
    Destination,
    /// The inventory of a zone addressed by name.
    Zone(Zone),
}

impl InventoryOwner {
    /// Whether this owner is a zone inventory (anything but the player).
    pub const fn is_zone(&self) -> bool {
        !matches!(self, Self::Player)
    }
}

impl core::fmt::Display for InventoryOwner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::CurrentZone => f.write_str("current_zone"),
            Self::Destination => f.write_str("destination"),
            Self::Zone(zone) => write!(f, "zone({zone})"),
        }
    }
}

/// A concrete inventory once the owner has been resolved against the state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryTarget {
    /// The player's inventory.
    Player,
    /// A named zone's inventory.
    Zone(Zone),
}

impl core::fmt::Display for InventoryTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Zone(zone) => write!(f, "zone {zone}"),
        }
    }
}

/// Stacks added to, removed from and capped in one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryChanges {
    /// Stacks added when the transformation is applied.
    #[serde(default)]
    pub add: Vec<ItemStack>,
    /// Stacks removed when applied; the inventory must hold them.
    #[serde(default)]
    pub remove: Vec<ItemStack>,
    /// Upper bounds the inventory must respect for the transformation to be legal.
    #[serde(default)]
    pub max: Vec<ItemStack>,
}

impl InventoryChanges {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.max.is_empty()
    }

    fn items(&self) -> impl Iterator<Item = &Item> {
        self.add
            .iter()
            .chain(&self.remove)
            .chain(&self.max)
            .map(|stack| &stack.item)
    }
}

/// Why a transformation is not legal in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegalityViolation {
    /// The player is not in any of the allowed zones.
    OutsideZones {
        /// Where the player stands, if anywhere.
        current: Option<Zone>,
    },
    /// A current-zone change while the player has no position.
    NoCurrentZone,
    /// A destination change on a transformation without destination.
    NoDestination,
    /// An inventory does not hold enough of a removed item.
    Insufficient {
        /// The inventory checked.
        inventory: InventoryTarget,
        /// The removed item.
        item: Item,
        /// Total quantity removed from that inventory.
        required: u32,
        /// Quantity actually held.
        held: u32,
    },
    /// An inventory holds more of an item than a `max` guard allows.
    AboveMax {
        /// The inventory checked.
        inventory: InventoryTarget,
        /// The capped item.
        item: Item,
        /// The cap.
        max: u32,
        /// Quantity actually held.
        held: u32,
    },
}

impl core::fmt::Display for LegalityViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutsideZones { current: Some(zone) } => {
                write!(f, "not allowed in zone {zone}")
            }
            Self::OutsideZones { current: None } => f.write_str("player has no zone"),
            Self::NoCurrentZone => f.write_str("current zone inventory without a current zone"),
            Self::NoDestination => f.write_str("destination inventory without a destination"),
            Self::Insufficient {
                inventory,
                item,
                required,
                held,
            } => write!(f, "{inventory} holds {held} {item}, needs {required}"),
            Self::AboveMax {
                inventory,
                item,
                max,
                held,
            } => write!(f, "{inventory} holds {held} {item}, at most {max} allowed"),
        }
    }
}

/// One atomic world change with its preconditions and effects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transformation {
    name: Option<String>,
    zones: Option<Vec<Zone>>,
    destination: Option<Zone>,
    changes: BTreeMap<InventoryOwner, InventoryChanges>,
}

impl Transformation {
    /// Create a transformation with no precondition and no effect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the transformation an explicit name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the transformation to the given zones.
    #[must_use]
    pub fn in_zones<Z: Into<Zone>>(mut self, zones: impl IntoIterator<Item = Z>) -> Self {
        self.zones = Some(zones.into_iter().map(Into::into).collect());
        self
    }

    /// Move the player to `zone` when applied.
    #[must_use]
    pub fn to_zone(mut self, zone: impl Into<Zone>) -> Self {
        self.destination = Some(zone.into());
        self
    }

    /// Add `stack` to the inventory of `owner` when applied.
    #[must_use]
    pub fn add(mut self, owner: InventoryOwner, stack: impl Into<ItemStack>) -> Self {
        self.changes.entry(owner).or_default().add.push(stack.into());
        self
    }

    /// Remove `stack` from the inventory of `owner` when applied.
    #[must_use]
    pub fn remove(mut self, owner: InventoryOwner, stack: impl Into<ItemStack>) -> Self {
        self.changes.entry(owner).or_default().remove.push(stack.into());
        self
    }

    /// Only allow the transformation while `owner` holds at most `stack`.
    #[must_use]
    pub fn max(mut self, owner: InventoryOwner, stack: impl Into<ItemStack>) -> Self {
        self.changes.entry(owner).or_default().max.push(stack.into());
        self
    }

    /// The explicit name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Zones in which the transformation is legal (`None` means anywhere).
    pub fn zones(&self) -> Option<&[Zone]> {
        self.zones.as_deref()
    }

    /// Zone the player moves to when applied.
    pub const fn destination(&self) -> Option<&Zone> {
        self.destination.as_ref()
    }

    /// Changes addressed to one owner.
    pub fn changes(&self, owner: &InventoryOwner) -> Option<&InventoryChanges> {
        self.changes.get(owner)
    }

    /// All changes, ordered by owner.
    pub fn inventory_changes(&self) -> impl Iterator<Item = (&InventoryOwner, &InventoryChanges)> {
        self.changes.iter()
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    /// Items added to the player inventory.
    pub fn produced_items(&self) -> BTreeSet<Item> {
        self.collect_items(false, |changes| &changes.add)
    }

    /// Items removed from the player inventory.
    pub fn consumed_items(&self) -> BTreeSet<Item> {
        self.collect_items(false, |changes| &changes.remove)
    }

    /// Items added to any zone inventory.
    pub fn produced_zones_items(&self) -> BTreeSet<Item> {
        self.collect_items(true, |changes| &changes.add)
    }

    /// Items removed from any zone inventory.
    pub fn consumed_zones_items(&self) -> BTreeSet<Item> {
        self.collect_items(true, |changes| &changes.remove)
    }

    /// Every item this transformation mentions, player side or zone side.
    pub fn mentioned_items(&self) -> BTreeSet<Item> {
        self.changes
            .values()
            .flat_map(InventoryChanges::items)
            .cloned()
            .collect()
    }

    /// Every item this transformation mentions in a zone inventory.
    pub fn mentioned_zones_items(&self) -> BTreeSet<Item> {
        self.changes
            .iter()
            .filter(|(owner, _)| owner.is_zone())
            .flat_map(|(_, changes)| changes.items())
            .cloned()
            .collect()
    }

    /// Every zone this transformation mentions.
    pub fn mentioned_zones(&self) -> BTreeSet<Zone> {
        let mut zones: BTreeSet<Zone> = self.zones.iter().flatten().cloned().collect();
        zones.extend(self.destination.iter().cloned());
        zones.extend(self.changes.keys().filter_map(|owner| match owner {
            InventoryOwner::Zone(zone) => Some(zone.clone()),
            _ => None,
        }));
        zones
    }

    /// Smallest holding of `owner` that satisfies the removes, summed per item.
    pub fn min_required(&self, owner: &InventoryOwner) -> BTreeMap<Item, u32> {
        let mut required: BTreeMap<Item, u32> = BTreeMap::new();
        for stack in self.changes.get(owner).into_iter().flat_map(|c| &c.remove) {
            let total = required.entry(stack.item.clone()).or_insert(0);
            *total = total.saturating_add(stack.quantity);
        }
        required
    }

    /// Caps the `max` guards put on `owner`; the tightest cap wins per item.
    pub fn max_allowed(&self, owner: &InventoryOwner) -> BTreeMap<Item, u32> {
        let mut allowed: BTreeMap<Item, u32> = BTreeMap::new();
        for stack in self.changes.get(owner).into_iter().flat_map(|c| &c.max) {
            allowed
                .entry(stack.item.clone())
                .and_modify(|cap| *cap = (*cap).min(stack.quantity))
                .or_insert(stack.quantity);
        }
        allowed
    }

    fn collect_items(
        &self,
        zone_side: bool,
        pick: fn(&InventoryChanges) -> &Vec<ItemStack>,
    ) -> BTreeSet<Item> {
        self.changes
            .iter()
            .filter(|(owner, _)| owner.is_zone() == zone_side)
            .flat_map(|(_, changes)| pick(changes))
            .map(|stack| stack.item.clone())
            .collect()
    }

    // -------------------------------------------------------------------
    // Validation, legality and application
    // -------------------------------------------------------------------

    /// Check the transformation is well formed for a world with or without zones.
    pub(crate) fn validate(&self, world_has_zones: bool) -> Result<(), WorldError> {
        for (owner, changes) in &self.changes {
            if let Some(stack) = changes
                .add
                .iter()
                .chain(&changes.remove)
                .find(|stack| stack.quantity == 0)
            {
                return Err(WorldError::ZeroQuantity {
                    transformation: self.to_string(),
                    item: stack.item.clone(),
                });
            }
            if *owner == InventoryOwner::Destination && self.destination.is_none() {
                return Err(WorldError::DestinationWithoutMove {
                    transformation: self.to_string(),
                });
            }
            if owner.is_zone() && !world_has_zones && !changes.is_empty() {
                return Err(WorldError::MissingZone {
                    transformation: self.to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve(
        &self,
        owner: &InventoryOwner,
        state: &WorldState,
    ) -> Result<InventoryTarget, LegalityViolation> {
        match owner {
            InventoryOwner::Player => Ok(InventoryTarget::Player),
            InventoryOwner::CurrentZone => state
                .current_zone()
                .map(|zone| InventoryTarget::Zone(zone.clone()))
                .ok_or(LegalityViolation::NoCurrentZone),
            InventoryOwner::Destination => self
                .destination
                .as_ref()
                .map(|zone| InventoryTarget::Zone(zone.clone()))
                .ok_or(LegalityViolation::NoDestination),
            InventoryOwner::Zone(zone) => Ok(InventoryTarget::Zone(zone.clone())),
        }
    }

    /// Check every precondition against `state`.
    ///
    /// Removes aimed at the same inventory and item are summed before being
    /// compared, so a transformation that is reported legal can always be
    /// applied without any count going negative.
    pub fn check(&self, state: &WorldState) -> Result<(), LegalityViolation> {
        if let Some(zones) = &self.zones {
            let current = state.current_zone();
            if !current.is_some_and(|zone| zones.contains(zone)) {
                return Err(LegalityViolation::OutsideZones {
                    current: current.cloned(),
                });
            }
        }

        let mut targets = Vec::with_capacity(self.changes.len());
        for (owner, changes) in &self.changes {
            targets.push((self.resolve(owner, state)?, changes));
        }

        let mut required: BTreeMap<(&InventoryTarget, &Item), u32> = BTreeMap::new();
        for (target, changes) in &targets {
            for stack in &changes.remove {
                let total = required.entry((target, &stack.item)).or_insert(0);
                *total = total.saturating_add(stack.quantity);
            }
        }
        for ((inventory, item), total) in required {
            let held = state.held(inventory, item);
            if held < total {
                return Err(LegalityViolation::Insufficient {
                    inventory: inventory.clone(),
                    item: item.clone(),
                    required: total,
                    held,
                });
            }
        }

        for (target, changes) in &targets {
            for stack in &changes.max {
                let held = state.held(target, &stack.item);
                if held > stack.quantity {
                    return Err(LegalityViolation::AboveMax {
                        inventory: target.clone(),
                        item: stack.item.clone(),
                        max: stack.quantity,
                        held,
                    });
                }
            }
        }

        Ok(())
    }

    /// Whether the transformation is legal in `state`.
    pub fn is_legal(&self, state: &WorldState) -> bool {
        self.check(state).is_ok()
    }

    /// Apply the transformation to `state`, or reject it untouched.
    pub(crate) fn apply(&self, id: TransformationId, state: &mut WorldState) -> Result<(), WorldError> {
        let illegal = |violation| WorldError::IllegalTransformation { id, violation };
        self.check(state).map_err(illegal)?;

        let mut staged: BTreeMap<InventoryTarget, Inventory> = BTreeMap::new();
        let mut resolved = Vec::with_capacity(self.changes.len());
        for (owner, changes) in &self.changes {
            let target = self.resolve(owner, state).map_err(illegal)?;
            if !staged.contains_key(&target) {
                staged.insert(target.clone(), state.inventory(&target));
            }
            resolved.push((target, changes));
        }

        for (target, changes) in &resolved {
            if let Some(inventory) = staged.get_mut(target) {
                for stack in &changes.remove {
                    inventory.remove(stack)?;
                }
            }
        }
        for (target, changes) in &resolved {
            if let Some(inventory) = staged.get_mut(target) {
                for stack in &changes.add {
                    inventory.add(stack)?;
                }
            }
        }

        state.commit(staged, self.destination.clone());
        Ok(())
    }
}

impl core::fmt::Display for Transformation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        let mut parts: Vec<String> = Vec::new();
        for (owner, changes) in &self.changes {
            let mut part = format!("{owner}:");
            for (sign, stacks) in [("-", &changes.remove), ("+", &changes.add), ("<=", &changes.max)] {
                if !stacks.is_empty() {
                    let joined: Vec<String> = stacks.iter().map(ToString::to_string).collect();
                    part.push_str(&format!("{sign}[{}]", joined.join(",")));
                }
            }
            parts.push(part);
        }
        if let Some(destination) = &self.destination {
            parts.push(format!("-> {destination}"));
        }
        if let Some(zones) = &self.zones {
            let joined: Vec<&str> = zones.iter().map(Zone::name).collect();
            parts.push(format!("@[{}]", joined.join(",")));
        }
        if parts.is_empty() {
            f.write_str("noop")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}
