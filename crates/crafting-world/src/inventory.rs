//! Inventory operations for the player and for zones.
//!
//! An inventory maps items to non-negative counts. All arithmetic is
//! checked: removing more than is held and overflowing `u32` are both
//! errors, never silent clamps or wraps. Items whose count reaches zero are
//! dropped from the map so two inventories with the same contents compare
//! equal.

use std::collections::BTreeMap;

use crafting_types::{Item, ItemStack};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Counts of items held by the player or lying in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    stacks: BTreeMap<Item, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    pub const fn new() -> Self {
        Self {
            stacks: BTreeMap::new(),
        }
    }

    /// Quantity held of `item` (zero when absent).
    pub fn quantity(&self, item: &Item) -> u32 {
        self.stacks.get(item).copied().unwrap_or(0)
    }

    /// Check whether the inventory holds at least the given stack.
    pub fn has(&self, stack: &ItemStack) -> bool {
        self.quantity(&stack.item) >= stack.quantity
    }

    /// Whether the inventory holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Iterate over held items and their (non-zero) counts.
    pub fn iter(&self) -> impl Iterator<Item = (&Item, u32)> {
        self.stacks.iter().map(|(item, qty)| (item, *qty))
    }

    /// Add a stack to the inventory.
    ///
    /// Fails with [`WorldError::QuantityOverflow`] if the count would
    /// exceed `u32::MAX`.
    pub fn add(&mut self, stack: &ItemStack) -> Result<(), WorldError> {
        if stack.quantity == 0 {
            return Ok(());
        }
        let current = self.quantity(&stack.item);
        let updated = current
            .checked_add(stack.quantity)
            .ok_or_else(|| WorldError::QuantityOverflow {
                item: stack.item.clone(),
            })?;
        self.stacks.insert(stack.item.clone(), updated);
        Ok(())
    }

    /// Remove a stack from the inventory.
    ///
    /// Callers check legality first; a stack larger than the held count is
    /// still reported as [`WorldError::InsufficientQuantity`] rather than
    /// being clamped to zero. Removes the key entirely if the count reaches zero.
    pub fn remove(&mut self, stack: &ItemStack) -> Result<(), WorldError> {
        let current = self.quantity(&stack.item);
        let remaining = current
            .checked_sub(stack.quantity)
            .ok_or_else(|| WorldError::InsufficientQuantity {
                item: stack.item.clone(),
                held: current,
                requested: stack.quantity,
            })?;
        if remaining == 0 {
            self.stacks.remove(&stack.item);
        } else {
            self.stacks.insert(stack.item.clone(), remaining);
        }
        Ok(())
    }

    /// Project the inventory onto an ordered item list.
    pub fn to_counts(&self, order: &[Item]) -> Vec<u32> {
        order.iter().map(|item| self.quantity(item)).collect()
    }
}

impl FromIterator<ItemStack> for Inventory {
    /// Collect stacks into an inventory, saturating on overflow.
    fn from_iter<T: IntoIterator<Item = ItemStack>>(iter: T) -> Self {
        let mut stacks: BTreeMap<Item, u32> = BTreeMap::new();
        for stack in iter {
            if stack.quantity == 0 {
                continue;
            }
            let entry = stacks.entry(stack.item).or_insert(0);
            *entry = entry.saturating_add(stack.quantity);
        }
        Self { stacks }
    }
}
