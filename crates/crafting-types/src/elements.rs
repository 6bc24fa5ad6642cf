//! Identity types for the things a crafting world is made of.
//!
//! [`Item`] and [`Zone`] are opaque names, unique within a world.
//! [`ItemStack`] pairs an item with a quantity and is the unit every
//! inventory change is expressed in.

use serde::{Deserialize, Serialize};

/// Generates a string-backed identity newtype.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identity from its name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Return the name.
            pub fn name(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name! {
    /// Something that can be held in an inventory (wood, a key, an open door).
    Item
}

define_name! {
    /// A location the player can stand in. Every zone owns an inventory.
    Zone
}

/// An item together with a quantity.
///
/// Stacks used in `add` and `remove` effects must carry a quantity of at
/// least one; `max` guards may use zero to mean "none allowed".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The stacked item.
    pub item: Item,
    /// How many units of the item.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl ItemStack {
    /// Create a stack of `quantity` units of `item`.
    pub fn new(item: impl Into<Item>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }

    /// Create a stack holding a single unit of `item`.
    pub fn one(item: impl Into<Item>) -> Self {
        Self::new(item, 1)
    }
}

impl From<Item> for ItemStack {
    fn from(item: Item) -> Self {
        Self::one(item)
    }
}

impl From<&Item> for ItemStack {
    fn from(item: &Item) -> Self {
        Self::one(item.clone())
    }
}

impl From<&str> for ItemStack {
    fn from(name: &str) -> Self {
        Self::one(name)
    }
}

impl core::fmt::Display for ItemStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.quantity == 1 {
            write!(f, "{}", self.item)
        } else {
            write!(f, "{}[{}]", self.item, self.quantity)
        }
    }
}

const fn default_quantity() -> u32 {
    1
}
