//! Live state of one episode: inventories and the player's position.
//!
//! [`WorldState`] is the only mutable part of the simulation. Legality
//! queries are pure reads; [`WorldState::step`] is the sole mutator and
//! either applies a transformation completely or rejects it without touching
//! anything.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crafting_types::{Item, Observation, Snapshot, TransformationId, Zone};
use tracing::debug;

use crate::error::WorldError;
use crate::inventory::Inventory;
use crate::transformation::InventoryTarget;
use crate::world::World;

/// Player inventory, position and zone inventories over a shared [`World`].
#[derive(Debug, Clone)]
pub struct WorldState {
    world: Arc<World>,
    player: Inventory,
    current_zone: Option<Zone>,
    zones: BTreeMap<Zone, Inventory>,
}

impl WorldState {
    /// Create the initial state: empty inventories, player in the start zone.
    pub fn new(world: Arc<World>) -> Self {
        let current_zone = world.start_zone().cloned();
        let zones = world
            .zones()
            .iter()
            .map(|zone| (zone.clone(), Inventory::new()))
            .collect();
        Self {
            world,
            player: Inventory::new(),
            current_zone,
            zones,
        }
    }

    /// Return to the initial state of an episode.
    pub fn reset(&mut self) {
        self.player = Inventory::new();
        self.current_zone = self.world.start_zone().cloned();
        for inventory in self.zones.values_mut() {
            *inventory = Inventory::new();
        }
    }

    /// The catalog this state evolves in.
    pub const fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// The player's inventory.
    pub const fn player_inventory(&self) -> &Inventory {
        &self.player
    }

    /// The zone the player stands in.
    pub const fn current_zone(&self) -> Option<&Zone> {
        self.current_zone.as_ref()
    }

    /// The inventory of a zone.
    pub fn zone_inventory(&self, zone: &Zone) -> Result<&Inventory, WorldError> {
        self.zones
            .get(zone)
            .ok_or_else(|| WorldError::UnknownZone(zone.clone()))
    }

    /// Quantity of `item` held by an inventory (zero for unknown zones).
    pub fn held(&self, target: &InventoryTarget, item: &Item) -> u32 {
        match target {
            InventoryTarget::Player => self.player.quantity(item),
            InventoryTarget::Zone(zone) => self
                .zones
                .get(zone)
                .map_or(0, |inventory| inventory.quantity(item)),
        }
    }

    /// Copy of an inventory, used to stage a transformation.
    pub(crate) fn inventory(&self, target: &InventoryTarget) -> Inventory {
        match target {
            InventoryTarget::Player => self.player.clone(),
            InventoryTarget::Zone(zone) => self.zones.get(zone).cloned().unwrap_or_default(),
        }
    }

    /// Write staged inventories back and move the player.
    pub(crate) fn commit(
        &mut self,
        staged: BTreeMap<InventoryTarget, Inventory>,
        destination: Option<Zone>,
    ) {
        for (target, inventory) in staged {
            match target {
                InventoryTarget::Player => self.player = inventory,
                InventoryTarget::Zone(zone) => {
                    self.zones.insert(zone, inventory);
                }
            }
        }
        if let Some(zone) = destination {
            self.current_zone = Some(zone);
        }
    }

    // -------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------

    /// Whether a transformation is legal right now.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownTransformation`] for an id outside the catalog.
    pub fn is_legal(&self, id: TransformationId) -> Result<bool, WorldError> {
        Ok(self.world.transformation(id)?.is_legal(self))
    }

    /// Identifiers of every transformation legal right now.
    pub fn legal_transformations(&self) -> BTreeSet<TransformationId> {
        self.world
            .enumerate_transformations()
            .filter(|(_, transformation)| transformation.is_legal(self))
            .map(|(id, _)| id)
            .collect()
    }

    /// Legality of every transformation, indexed by id.
    pub fn legality_mask(&self) -> Vec<bool> {
        self.world
            .transformations()
            .iter()
            .map(|transformation| transformation.is_legal(self))
            .collect()
    }

    /// Apply a transformation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownTransformation`] for an id outside the
    /// catalog and [`WorldError::IllegalTransformation`] if a precondition
    /// fails. In both cases the state is unchanged.
    pub fn step(&mut self, id: TransformationId) -> Result<(), WorldError> {
        let world = Arc::clone(&self.world);
        let transformation = world.transformation(id)?;
        match transformation.apply(id, self) {
            Ok(()) => {
                debug!(%id, %transformation, zone = ?self.current_zone, "Transformation applied");
                Ok(())
            }
            Err(err) => {
                debug!(%id, %transformation, %err, "Transformation rejected");
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------

    /// Numeric view of the state in catalog order.
    pub fn snapshot(&self) -> Snapshot {
        let player_inventory = self.player.to_counts(self.world.items());
        let current_zone = self
            .current_zone
            .as_ref()
            .and_then(|zone| self.world.zone_index(zone).ok());
        let zones_inventories = self
            .world
            .zones()
            .iter()
            .map(|zone| {
                self.zones
                    .get(zone)
                    .map_or_else(
                        || vec![0; self.world.zones_items().len()],
                        |inventory| inventory.to_counts(self.world.zones_items()),
                    )
            })
            .collect();
        Snapshot {
            player_inventory,
            current_zone,
            zones_inventories,
        }
    }

    /// Snapshot plus legality vector, as handed to a decision source.
    pub fn observation(&self) -> Observation {
        Observation {
            snapshot: self.snapshot(),
            legal_actions: self.legality_mask(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crafting_types::ItemStack;

    use super::*;
    use crate::transformation::{InventoryOwner, Transformation};

    fn world() -> Arc<World> {
        let transformations = vec![
            Transformation::new()
                .named("search wood")
                .in_zones(["forest"])
                .add(InventoryOwner::Player, ItemStack::one("wood")),
            Transformation::new()
                .named("craft plank")
                .remove(InventoryOwner::Player, ItemStack::one("wood"))
                .add(InventoryOwner::Player, ItemStack::new("plank", 4)),
            Transformation::new()
                .named("place table")
                .remove(InventoryOwner::Player, ItemStack::new("plank", 4))
                .add(InventoryOwner::CurrentZone, ItemStack::one("table")),
            Transformation::new().named("go home").to_zone("home"),
            Transformation::new().named("go forest").to_zone("forest"),
        ];
        Arc::new(World::new(transformations, Some(Zone::new("forest"))).unwrap())
    }

    #[test]
    fn initial_state_is_empty_in_start_zone() {
        let state = WorldState::new(world());
        assert!(state.player_inventory().is_empty());
        assert_eq!(state.current_zone(), Some(&Zone::new("forest")));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.player_inventory, vec![0, 0, 0]);
        assert_eq!(snapshot.current_zone, Some(0));
        assert_eq!(snapshot.zones_inventories, vec![vec![0], vec![0]]);
    }

    #[test]
    fn legal_transformations_follow_state() {
        let mut state = WorldState::new(world());
        let legal = state.legal_transformations();
        assert_eq!(
            legal,
            BTreeSet::from([
                TransformationId::new(0),
                TransformationId::new(3),
                TransformationId::new(4)
            ])
        );
        state.step(TransformationId::new(0)).unwrap();
        assert!(state.is_legal(TransformationId::new(1)).unwrap());
        assert_eq!(
            state.legality_mask(),
            vec![true, true, false, true, true]
        );
    }

    #[test]
    fn crafting_chain_updates_snapshot() {
        let mut state = WorldState::new(world());
        for id in [0, 1, 2] {
            state.step(TransformationId::new(id)).unwrap();
        }
        let snapshot = state.snapshot();
        // items: plank, table, wood
        assert_eq!(snapshot.player_inventory, vec![0, 0, 0]);
        // zones: forest, home ; zone items: table
        assert_eq!(snapshot.zones_inventories, vec![vec![1], vec![0]]);
    }

    #[test]
    fn movement_changes_position() {
        let mut state = WorldState::new(world());
        state.step(TransformationId::new(3)).unwrap();
        assert_eq!(state.current_zone(), Some(&Zone::new("home")));
        assert_eq!(state.snapshot().position_one_hot(), vec![0, 1]);
        assert!(!state.is_legal(TransformationId::new(0)).unwrap());
    }

    #[test]
    fn unknown_transformation_is_rejected() {
        let mut state = WorldState::new(world());
        assert!(matches!(
            state.step(TransformationId::new(42)),
            Err(WorldError::UnknownTransformation(_))
        ));
        assert!(state.is_legal(TransformationId::new(42)).is_err());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = WorldState::new(world());
        state.step(TransformationId::new(0)).unwrap();
        state.step(TransformationId::new(3)).unwrap();
        state.reset();
        assert_eq!(state.snapshot(), WorldState::new(world()).snapshot());
    }

    #[test]
    fn observation_carries_legality() {
        let state = WorldState::new(world());
        let observation = state.observation();
        assert_eq!(observation.legal_actions.len(), 5);
        assert!(observation.is_legal(TransformationId::new(0)));
        assert!(!observation.is_legal(TransformationId::new(1)));
    }
}
