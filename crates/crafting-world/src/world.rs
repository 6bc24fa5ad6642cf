//! The immutable world catalog.
//!
//! A [`World`] is built once from a list of transformations. It derives the
//! items, zones and zone items those transformations mention, fixes their
//! order (sorted by name, independent of input order), validates every
//! transformation and builds the [`RequirementsGraph`]. Nothing in a `World`
//! changes afterwards, so it is shared behind an `Arc` between world states
//! and purposes.

use std::collections::{BTreeMap, BTreeSet};

use crafting_types::{Item, TransformationId, Zone};
use tracing::info;

use crate::error::WorldError;
use crate::requirements::{Node, RequirementsGraph};
use crate::transformation::Transformation;

/// Catalog of items, zones and transformations of one crafting world.
#[derive(Debug, Clone)]
pub struct World {
    items: Vec<Item>,
    zones: Vec<Zone>,
    zones_items: Vec<Item>,
    transformations: Vec<Transformation>,
    start_zone: Option<Zone>,
    item_index: BTreeMap<Item, usize>,
    zone_index: BTreeMap<Zone, usize>,
    zone_item_index: BTreeMap<Item, usize>,
    requirements: RequirementsGraph,
}

impl World {
    /// Build a world from its transformations.
    ///
    /// The start zone defaults to the first zone in catalog order. A start
    /// zone that no transformation mentions is still part of the world.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found among the transformations
    /// ([`WorldError::ZeroQuantity`], [`WorldError::DestinationWithoutMove`],
    /// [`WorldError::MissingZone`]).
    pub fn new(
        transformations: Vec<Transformation>,
        start_zone: Option<Zone>,
    ) -> Result<Self, WorldError> {
        let mut items = BTreeSet::new();
        let mut zones = BTreeSet::new();
        let mut zones_items = BTreeSet::new();
        for transformation in &transformations {
            items.extend(transformation.mentioned_items());
            zones.extend(transformation.mentioned_zones());
            zones_items.extend(transformation.mentioned_zones_items());
        }
        zones.extend(start_zone.iter().cloned());

        for transformation in &transformations {
            transformation.validate(!zones.is_empty())?;
        }

        let items: Vec<Item> = items.into_iter().collect();
        let zones: Vec<Zone> = zones.into_iter().collect();
        let zones_items: Vec<Item> = zones_items.into_iter().collect();
        let start_zone = start_zone.or_else(|| zones.first().cloned());

        let mut requirements = RequirementsGraph::from_transformations(&transformations);
        if let Some(zone) = &start_zone {
            requirements.insert_node(Node::Zone(zone.clone()));
        }

        info!(
            items = items.len(),
            zones = zones.len(),
            zones_items = zones_items.len(),
            transformations = transformations.len(),
            graph_nodes = requirements.node_count(),
            graph_edges = requirements.edge_count(),
            start_zone = start_zone.as_ref().map(Zone::name),
            "World built"
        );

        Ok(Self {
            item_index: index_of(&items),
            zone_index: index_of(&zones),
            zone_item_index: index_of(&zones_items),
            items,
            zones,
            zones_items,
            transformations,
            start_zone,
            requirements,
        })
    }

    /// All items, in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All zones, in catalog order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Items that can lie in a zone inventory, in catalog order.
    pub fn zones_items(&self) -> &[Item] {
        &self.zones_items
    }

    /// All transformations; their position is their [`TransformationId`].
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    /// Number of transformations (size of the action space).
    pub fn transformation_count(&self) -> usize {
        self.transformations.len()
    }

    /// Look up a transformation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownTransformation`] for an id outside the catalog.
    pub fn transformation(&self, id: TransformationId) -> Result<&Transformation, WorldError> {
        self.transformations
            .get(id.index())
            .ok_or(WorldError::UnknownTransformation(id))
    }

    /// Iterate over transformations with their identifiers.
    pub fn enumerate_transformations(
        &self,
    ) -> impl Iterator<Item = (TransformationId, &Transformation)> {
        self.transformations
            .iter()
            .enumerate()
            .map(|(index, transformation)| (TransformationId::new(index), transformation))
    }

    /// Zone the player starts every episode in.
    pub const fn start_zone(&self) -> Option<&Zone> {
        self.start_zone.as_ref()
    }

    /// Catalog position of an item.
    pub fn item_index(&self, item: &Item) -> Result<usize, WorldError> {
        self.item_index
            .get(item)
            .copied()
            .ok_or_else(|| WorldError::UnknownItem(item.clone()))
    }

    /// Catalog position of a zone.
    pub fn zone_index(&self, zone: &Zone) -> Result<usize, WorldError> {
        self.zone_index
            .get(zone)
            .copied()
            .ok_or_else(|| WorldError::UnknownZone(zone.clone()))
    }

    /// Position of an item among zone items.
    pub fn zone_item_index(&self, item: &Item) -> Result<usize, WorldError> {
        self.zone_item_index
            .get(item)
            .copied()
            .ok_or_else(|| WorldError::UnknownItem(item.clone()))
    }

    /// The requirements graph derived from the transformations.
    pub const fn requirements(&self) -> &RequirementsGraph {
        &self.requirements
    }
}

fn index_of<T: Ord + Clone>(ordered: &[T]) -> BTreeMap<T, usize> {
    ordered
        .iter()
        .enumerate()
        .map(|(index, value)| (value.clone(), index))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crafting_types::ItemStack;

    use super::*;
    use crate::transformation::InventoryOwner;

    fn transformations() -> Vec<Transformation> {
        vec![
            Transformation::new()
                .in_zones(["forest"])
                .add(InventoryOwner::Player, ItemStack::one("wood")),
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("wood"))
                .add(InventoryOwner::CurrentZone, ItemStack::one("campfire")),
            Transformation::new().to_zone("cave"),
        ]
    }

    #[test]
    fn catalog_is_sorted_and_deduplicated() {
        let world = World::new(transformations(), None).unwrap();
        assert_eq!(world.items(), &[Item::new("campfire"), Item::new("wood")]);
        assert_eq!(world.zones(), &[Zone::new("cave"), Zone::new("forest")]);
        assert_eq!(world.zones_items(), &[Item::new("campfire")]);
        assert_eq!(world.transformation_count(), 3);
    }

    #[test]
    fn catalog_order_ignores_input_order() {
        let mut reversed = transformations();
        reversed.reverse();
        let a = World::new(transformations(), None).unwrap();
        let b = World::new(reversed, None).unwrap();
        assert_eq!(a.items(), b.items());
        assert_eq!(a.zones(), b.zones());
        assert_eq!(a.zones_items(), b.zones_items());
    }

    #[test]
    fn start_zone_defaults_to_first_zone() {
        let world = World::new(transformations(), None).unwrap();
        assert_eq!(world.start_zone(), Some(&Zone::new("cave")));
    }

    #[test]
    fn unmentioned_start_zone_joins_the_world() {
        let world = World::new(transformations(), Some(Zone::new("beach"))).unwrap();
        assert_eq!(world.start_zone(), Some(&Zone::new("beach")));
        assert_eq!(world.zone_index(&Zone::new("beach")).unwrap(), 0);
        assert!(world.requirements().contains(&Node::Zone(Zone::new("beach"))));
    }

    #[test]
    fn unknown_identifiers_are_errors() {
        let world = World::new(transformations(), None).unwrap();
        assert!(matches!(
            world.transformation(TransformationId::new(9)),
            Err(WorldError::UnknownTransformation(_))
        ));
        assert!(matches!(
            world.item_index(&Item::new("diamond")),
            Err(WorldError::UnknownItem(_))
        ));
        assert!(matches!(
            world.zone_index(&Zone::new("nether")),
            Err(WorldError::UnknownZone(_))
        ));
        assert!(matches!(
            world.zone_item_index(&Item::new("wood")),
            Err(WorldError::UnknownItem(_))
        ));
    }

    #[test]
    fn empty_world_is_valid() {
        let world = World::new(Vec::new(), None).unwrap();
        assert!(world.items().is_empty());
        assert!(world.zones().is_empty());
        assert_eq!(world.start_zone(), None);
    }

    #[test]
    fn zone_changes_without_zones_are_rejected() {
        let broken = vec![
            Transformation::new().add(InventoryOwner::CurrentZone, ItemStack::one("table")),
        ];
        assert!(matches!(
            World::new(broken, None),
            Err(WorldError::MissingZone { .. })
        ));
    }
}
