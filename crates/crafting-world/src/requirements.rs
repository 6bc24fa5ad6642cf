//! The requirements graph: "to obtain X you need Y".
//!
//! Nodes are items held by the player, zones, and items lying in zones. For
//! every transformation, each consumed element (a removed stack, or a zone
//! the transformation is restricted to) gets an edge to each produced
//! element (an added stack, or the destination zone). Edges from an element
//! to itself are dropped: a catalyst that is removed and given back is not a
//! dependency of itself.
//!
//! The graph is built once per world and only read afterwards.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crafting_types::{Item, TransformationId, Zone};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::transformation::Transformation;

/// The three kinds of requirements graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// An item in the player inventory.
    Item,
    /// A zone the player can stand in.
    Zone,
    /// An item lying in a zone inventory.
    ZoneItem,
}

impl NodeKind {
    /// Prefix used when printing nodes of this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Zone => "zone",
            Self::ZoneItem => "zone_item",
        }
    }
}

/// One element of the requirements graph.
///
/// The kind is part of the identity, so an item and a zone sharing a name
/// are distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Player-side item.
    Item(Item),
    /// Zone.
    Zone(Zone),
    /// Zone-side item.
    ZoneItem(Item),
}

impl Node {
    /// Kind of the node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Item(_) => NodeKind::Item,
            Self::Zone(_) => NodeKind::Zone,
            Self::ZoneItem(_) => NodeKind::ZoneItem,
        }
    }

    /// Bare name of the underlying item or zone.
    pub fn name(&self) -> &str {
        match self {
            Self::Item(item) | Self::ZoneItem(item) => item.name(),
            Self::Zone(zone) => zone.name(),
        }
    }
}

impl core::fmt::Display for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.kind().prefix(), self.name())
    }
}

/// Directed dependency graph derived from a transformation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementsGraph {
    nodes: BTreeSet<Node>,
    requirements: BTreeMap<Node, BTreeSet<Node>>,
    dependents: BTreeMap<Node, BTreeSet<Node>>,
    producers: BTreeMap<Node, BTreeSet<TransformationId>>,
    consumers: BTreeMap<Node, BTreeSet<TransformationId>>,
}

impl RequirementsGraph {
    /// Build the graph. Transformation ids are positions in `transformations`.
    pub fn from_transformations(transformations: &[Transformation]) -> Self {
        let mut graph = Self::default();
        for (index, transformation) in transformations.iter().enumerate() {
            let id = TransformationId::new(index);

            for item in transformation.mentioned_items() {
                graph.insert_node(Node::Item(item));
            }
            for item in transformation.mentioned_zones_items() {
                graph.insert_node(Node::ZoneItem(item));
            }
            for zone in transformation.mentioned_zones() {
                graph.insert_node(Node::Zone(zone));
            }

            let consumed = consumed_nodes(transformation);
            let produced = produced_nodes(transformation);
            for node in &consumed {
                graph.consumers.entry(node.clone()).or_default().insert(id);
            }
            for node in &produced {
                graph.producers.entry(node.clone()).or_default().insert(id);
            }
            for to in &produced {
                for from in consumed.iter().filter(|from| *from != to) {
                    graph.insert_edge(from.clone(), to.clone());
                }
            }
        }
        graph
    }

    /// Add an isolated node (no-op if already present).
    pub(crate) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node);
    }

    fn insert_edge(&mut self, from: Node, to: Node) {
        self.dependents
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.requirements.entry(to).or_default().insert(from);
    }

    /// All nodes, in node order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All edges as `(required, dependent)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.dependents
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(BTreeSet::len).sum()
    }

    /// Whether the node is part of the graph.
    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// Direct requirements of a node.
    pub fn requirements_of(&self, node: &Node) -> impl Iterator<Item = &Node> {
        self.requirements.get(node).into_iter().flatten()
    }

    /// Nodes that directly require `node`.
    pub fn dependents_of(&self, node: &Node) -> impl Iterator<Item = &Node> {
        self.dependents.get(node).into_iter().flatten()
    }

    /// Transformations that produce `node`, self-loops included.
    pub fn producers(&self, node: &Node) -> BTreeSet<TransformationId> {
        self.producers.get(node).cloned().unwrap_or_default()
    }

    /// Transformations that consume `node`, self-loops included.
    pub fn consumers(&self, node: &Node) -> BTreeSet<TransformationId> {
        self.consumers.get(node).cloned().unwrap_or_default()
    }

    /// Every node reachable backwards from `node`, excluding `node` itself.
    ///
    /// Tolerates cycles: each node is visited once.
    pub fn ancestors(&self, node: &Node) -> BTreeSet<Node> {
        let mut visited: BTreeSet<Node> = BTreeSet::new();
        let mut queue: VecDeque<&Node> = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            for required in self.requirements_of(current) {
                if visited.insert(required.clone()) {
                    queue.push_back(required);
                }
            }
        }
        visited.remove(node);
        visited
    }

    /// Nodes without requirements, obtainable directly.
    pub fn base_nodes(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| self.requirements_of(node).next().is_none())
            .collect()
    }

    /// Longest-path level of every node: base nodes are at level 0, any
    /// other node sits one level above its deepest requirement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RequirementsCycle`] if the graph has a cycle.
    pub fn levels(&self) -> Result<BTreeMap<Node, usize>, WorldError> {
        let mut pending: BTreeMap<&Node, usize> = self
            .nodes
            .iter()
            .map(|node| (node, self.requirements_of(node).count()))
            .collect();
        let mut ready: VecDeque<&Node> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut levels: BTreeMap<Node, usize> = BTreeMap::new();

        while let Some(node) = ready.pop_front() {
            pending.remove(node);
            let level = self
                .requirements_of(node)
                .filter_map(|required| levels.get(required))
                .map(|level| level.saturating_add(1))
                .max()
                .unwrap_or(0);
            levels.insert(node.clone(), level);
            for dependent in self.dependents_of(node) {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        if pending.is_empty() {
            Ok(levels)
        } else {
            let remaining: BTreeSet<&Node> = pending.into_keys().collect();
            Err(WorldError::RequirementsCycle {
                cycle: self.find_cycle(&remaining),
            })
        }
    }

    /// Number of levels above the base nodes (0 for a flat or empty graph).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RequirementsCycle`] if the graph has a cycle.
    pub fn depth(&self) -> Result<usize, WorldError> {
        Ok(self.levels()?.into_values().max().unwrap_or(0))
    }

    /// Walk requirements inside `remaining` until a node repeats.
    ///
    /// Every node left over by the layering has a requirement that is also
    /// left over, so the walk always closes a cycle.
    fn find_cycle(&self, remaining: &BTreeSet<&Node>) -> Vec<Node> {
        let mut path: Vec<&Node> = Vec::new();
        let mut current = remaining.first().copied();
        while let Some(node) = current {
            if let Some(start) = path.iter().position(|seen| *seen == node) {
                let mut cycle: Vec<Node> = path
                    .get(start..)
                    .unwrap_or_default()
                    .iter()
                    .rev()
                    .map(|node| (*node).clone())
                    .collect();
                cycle.insert(0, node.clone());
                return cycle;
            }
            path.push(node);
            current = self
                .requirements_of(node)
                .find(|required| remaining.contains(required));
        }
        path.into_iter().cloned().collect()
    }
}

fn consumed_nodes(transformation: &Transformation) -> BTreeSet<Node> {
    let mut nodes: BTreeSet<Node> = transformation
        .consumed_items()
        .into_iter()
        .map(Node::Item)
        .collect();
    nodes.extend(
        transformation
            .consumed_zones_items()
            .into_iter()
            .map(Node::ZoneItem),
    );
    nodes.extend(
        transformation
            .zones()
            .into_iter()
            .flatten()
            .cloned()
            .map(Node::Zone),
    );
    nodes
}

fn produced_nodes(transformation: &Transformation) -> BTreeSet<Node> {
    let mut nodes: BTreeSet<Node> = transformation
        .produced_items()
        .into_iter()
        .map(Node::Item)
        .collect();
    nodes.extend(
        transformation
            .produced_zones_items()
            .into_iter()
            .map(Node::ZoneItem),
    );
    nodes.extend(transformation.destination().cloned().map(Node::Zone));
    nodes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crafting_types::ItemStack;

    use super::*;
    use crate::transformation::InventoryOwner;

    fn item(name: &str) -> Node {
        Node::Item(Item::new(name))
    }

    fn zone(name: &str) -> Node {
        Node::Zone(Zone::new(name))
    }

    fn zone_item(name: &str) -> Node {
        Node::ZoneItem(Item::new(name))
    }

    fn chain() -> Vec<Transformation> {
        vec![
            Transformation::new().add(InventoryOwner::Player, ItemStack::one("item0")),
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("item0"))
                .add(InventoryOwner::Player, ItemStack::one("item1")),
            Transformation::new()
                .in_zones(["zone1"])
                .remove(InventoryOwner::Player, ItemStack::one("item1"))
                .add(InventoryOwner::Player, ItemStack::one("item2")),
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("item0"))
                .to_zone("zone1"),
        ]
    }

    #[test]
    fn node_names_are_prefixed_by_kind() {
        assert_eq!(item("stone").to_string(), "item#stone");
        assert_eq!(zone("stone").to_string(), "zone#stone");
        assert_eq!(zone_item("stone").to_string(), "zone_item#stone");
        assert_ne!(item("stone"), zone_item("stone"));
    }

    #[test]
    fn edges_go_from_consumed_to_produced() {
        let graph = RequirementsGraph::from_transformations(&chain());
        let edges: BTreeSet<(Node, Node)> = graph
            .edges()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        assert_eq!(
            edges,
            BTreeSet::from([
                (item("item0"), item("item1")),
                (item("item1"), item("item2")),
                (zone("zone1"), item("item2")),
                (item("item0"), zone("zone1")),
            ])
        );
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn ancestors_are_transitive_and_exclude_the_node() {
        let graph = RequirementsGraph::from_transformations(&chain());
        assert_eq!(
            graph.ancestors(&item("item2")),
            BTreeSet::from([item("item0"), item("item1"), zone("zone1")])
        );
        assert!(graph.ancestors(&item("item0")).is_empty());
        assert!(graph.ancestors(&item("unknown")).is_empty());
    }

    #[test]
    fn producers_and_consumers_index_transformations() {
        let graph = RequirementsGraph::from_transformations(&chain());
        assert_eq!(
            graph.producers(&item("item1")),
            BTreeSet::from([TransformationId::new(1)])
        );
        assert_eq!(
            graph.consumers(&item("item0")),
            BTreeSet::from([TransformationId::new(1), TransformationId::new(3)])
        );
        assert_eq!(
            graph.producers(&zone("zone1")),
            BTreeSet::from([TransformationId::new(3)])
        );
    }

    #[test]
    fn base_nodes_have_no_requirements() {
        let graph = RequirementsGraph::from_transformations(&chain());
        assert_eq!(graph.base_nodes(), vec![&item("item0")]);
    }

    #[test]
    fn levels_follow_longest_path() {
        let graph = RequirementsGraph::from_transformations(&chain());
        let levels = graph.levels().unwrap();
        assert_eq!(levels.get(&item("item0")), Some(&0));
        assert_eq!(levels.get(&item("item1")), Some(&1));
        assert_eq!(levels.get(&zone("zone1")), Some(&1));
        assert_eq!(levels.get(&item("item2")), Some(&2));
        assert_eq!(graph.depth().unwrap(), 2);
    }

    #[test]
    fn construction_ignores_transformation_order() {
        let mut reversed = chain();
        reversed.reverse();
        let a = RequirementsGraph::from_transformations(&chain());
        let b = RequirementsGraph::from_transformations(&reversed);
        assert!(a.nodes().eq(b.nodes()));
        assert!(a.edges().eq(b.edges()));
    }

    #[test]
    fn self_loops_are_not_edges() {
        let catalyst = vec![
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("pickaxe"))
                .add(InventoryOwner::Player, ItemStack::one("pickaxe"))
                .add(InventoryOwner::Player, ItemStack::one("stone")),
        ];
        let graph = RequirementsGraph::from_transformations(&catalyst);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.ancestors(&item("pickaxe")).is_empty());
        assert_eq!(
            graph.producers(&item("pickaxe")),
            BTreeSet::from([TransformationId::new(0)])
        );
        assert!(graph.levels().is_ok());
    }

    #[test]
    fn cycles_are_reported_by_levels() {
        let pickup_and_drop = vec![
            Transformation::new()
                .remove(InventoryOwner::CurrentZone, ItemStack::one("key"))
                .add(InventoryOwner::Player, ItemStack::one("key")),
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("key"))
                .add(InventoryOwner::CurrentZone, ItemStack::one("key")),
        ];
        let graph = RequirementsGraph::from_transformations(&pickup_and_drop);
        assert_eq!(
            graph.ancestors(&item("key")),
            BTreeSet::from([zone_item("key")])
        );
        let err = graph.levels().unwrap_err();
        assert!(matches!(
            &err,
            WorldError::RequirementsCycle { cycle }
                if cycle.len() == 3 && cycle.first() == cycle.last()
        ));
        assert!(err.to_string().contains("item#key"));
        assert!(graph.depth().is_err());
    }

    #[test]
    fn zone_items_are_distinct_from_items() {
        let place = vec![
            Transformation::new()
                .remove(InventoryOwner::Player, ItemStack::one("table"))
                .add(InventoryOwner::CurrentZone, ItemStack::one("table")),
        ];
        let graph = RequirementsGraph::from_transformations(&place);
        assert!(graph.contains(&item("table")));
        assert!(graph.contains(&zone_item("table")));
        assert_eq!(
            graph.requirements_of(&zone_item("table")).collect::<Vec<_>>(),
            vec![&item("table")]
        );
    }
}
