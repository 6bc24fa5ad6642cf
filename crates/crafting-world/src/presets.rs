//! Ready-made worlds.
//!
//! These are plain data fed into [`World::new`]. They double as fixtures for
//! the purpose layer and the episode runner.

use crafting_types::{Item, ItemStack, Zone};

use crate::error::WorldError;
use crate::transformation::{InventoryOwner, Transformation};
use crate::world::World;

// ---------------------------------------------------------------------------
// Wood house
// ---------------------------------------------------------------------------

/// Zone the wood house world starts in.
pub const START: &str = "start";
/// Second zone of the wood house world, reachable from [`START`].
pub const OTHER_ZONE: &str = "other_zone";
/// Searchable anywhere.
pub const WOOD: &str = "wood";
/// Searchable anywhere.
pub const STONE: &str = "stone";
/// Crafted from one wood, four at a time.
pub const PLANK: &str = "plank";
/// Placed in the current zone from four planks.
pub const TABLE: &str = "table";
/// Built in the current zone from planks and wood.
pub const WOOD_HOUSE: &str = "wood house";

/// Transformations of the wood house world, in a fixed order.
pub fn wood_house_transformations() -> Vec<Transformation> {
    vec![
        Transformation::new()
            .named("move to other zone")
            .in_zones([START])
            .to_zone(OTHER_ZONE),
        Transformation::new()
            .named("search wood")
            .add(InventoryOwner::Player, ItemStack::one(WOOD)),
        Transformation::new()
            .named("search stone")
            .add(InventoryOwner::Player, ItemStack::one(STONE)),
        Transformation::new()
            .named("craft plank")
            .remove(InventoryOwner::Player, ItemStack::one(WOOD))
            .add(InventoryOwner::Player, ItemStack::new(PLANK, 4)),
        Transformation::new()
            .named("craft table")
            .remove(InventoryOwner::Player, ItemStack::new(PLANK, 4))
            .add(InventoryOwner::CurrentZone, ItemStack::one(TABLE)),
        Transformation::new()
            .named("build house")
            .remove(InventoryOwner::Player, ItemStack::new(PLANK, 32))
            .remove(InventoryOwner::Player, ItemStack::new(WOOD, 8))
            .add(InventoryOwner::CurrentZone, ItemStack::one(WOOD_HOUSE)),
    ]
}

/// The wood house world, starting in [`START`].
pub fn wood_house() -> Result<World, WorldError> {
    World::new(wood_house_transformations(), Some(Zone::new(START)))
}

// ---------------------------------------------------------------------------
// Unlock pickup
// ---------------------------------------------------------------------------

/// Room the unlock pickup world starts in, holding the key and the door.
pub const START_ROOM: &str = "start_room";
/// Room behind the door, holding the box.
pub const BOX_ROOM: &str = "box_room";
/// Opens the locked door; kept when used.
pub const KEY: &str = "key";
/// The item to pick up.
pub const BOX: &str = "box";
/// Carried weight; the player carries at most one item.
pub const WEIGHT: &str = "weight";
/// Door between the rooms once unlocked.
pub const OPEN_DOOR: &str = "open_door";
/// Door between the rooms before unlocking.
pub const LOCKED_DOOR: &str = "locked_door";

/// Transformations of the unlock pickup world, in a fixed order.
pub fn unlock_pickup_transformations() -> Vec<Transformation> {
    let rooms = [START_ROOM, BOX_ROOM];
    let mut transformations = Vec::new();

    for (item, room) in [(KEY, START_ROOM), (BOX, BOX_ROOM)] {
        // Only searchable while nobody has found it yet.
        let mut search = Transformation::new()
            .named(format!("search {item}"))
            .in_zones([room])
            .add(InventoryOwner::CurrentZone, ItemStack::one(item))
            .max(InventoryOwner::Player, ItemStack::new(item, 0));
        for other in rooms {
            search = search.max(InventoryOwner::Zone(Zone::new(other)), ItemStack::new(item, 0));
        }
        transformations.push(search);

        transformations.push(
            Transformation::new()
                .named(format!("pickup {item}"))
                .remove(InventoryOwner::CurrentZone, ItemStack::one(item))
                .add(InventoryOwner::Player, ItemStack::one(item))
                .add(InventoryOwner::Player, ItemStack::one(WEIGHT))
                .max(InventoryOwner::Player, ItemStack::new(WEIGHT, 0)),
        );
        transformations.push(
            Transformation::new()
                .named(format!("put down {item}"))
                .remove(InventoryOwner::Player, ItemStack::one(item))
                .remove(InventoryOwner::Player, ItemStack::one(WEIGHT))
                .add(InventoryOwner::CurrentZone, ItemStack::one(item)),
        );
    }

    transformations.push(
        Transformation::new()
            .named("search door")
            .in_zones([START_ROOM])
            .add(InventoryOwner::CurrentZone, ItemStack::one(LOCKED_DOOR))
            .max(InventoryOwner::CurrentZone, ItemStack::new(LOCKED_DOOR, 0))
            .max(InventoryOwner::CurrentZone, ItemStack::new(OPEN_DOOR, 0)),
    );
    transformations.push(
        Transformation::new()
            .named("unlock door")
            .remove(InventoryOwner::Player, ItemStack::one(KEY))
            .add(InventoryOwner::Player, ItemStack::one(KEY))
            .remove(InventoryOwner::CurrentZone, ItemStack::one(LOCKED_DOOR))
            .add(InventoryOwner::CurrentZone, ItemStack::one(OPEN_DOOR)),
    );
    transformations.push(
        Transformation::new()
            .named("move to box room")
            .in_zones([START_ROOM])
            .to_zone(BOX_ROOM)
            .remove(InventoryOwner::CurrentZone, ItemStack::one(OPEN_DOOR))
            .add(InventoryOwner::CurrentZone, ItemStack::one(OPEN_DOOR)),
    );
    transformations.push(
        Transformation::new()
            .named("move to start room")
            .in_zones([BOX_ROOM])
            .to_zone(START_ROOM),
    );

    transformations
}

/// The unlock pickup world, starting in [`START_ROOM`].
pub fn unlock_pickup() -> Result<World, WorldError> {
    World::new(unlock_pickup_transformations(), Some(Zone::new(START_ROOM)))
}

/// The item an unlock pickup episode is about.
pub fn unlock_pickup_goal() -> Item {
    Item::new(BOX)
}
