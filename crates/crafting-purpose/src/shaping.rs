//! Reward-shaping subtask synthesis.
//!
//! Each strategy turns one goal into a set of elements (items, zones, zone
//! items) and emits one optional, unshaped task per element, in catalog
//! order: get-item tasks first, then go-to-zone tasks, then place-item
//! tasks.

use std::collections::BTreeSet;

use crafting_types::{Item, TransformationId, Zone};
use crafting_world::{Node, World};

use crate::error::PurposeError;
use crate::purpose::RewardShaping;
use crate::task::{Goal, Task};

/// Elements a shaping strategy wants rewarded.
#[derive(Debug, Default)]
struct Elements {
    items: BTreeSet<Item>,
    zones: BTreeSet<Zone>,
    zones_items: BTreeSet<Item>,
}

impl Elements {
    fn insert(&mut self, node: Node) {
        match node {
            Node::Item(item) => {
                self.items.insert(item);
            }
            Node::Zone(zone) => {
                self.zones.insert(zone);
            }
            Node::ZoneItem(item) => {
                self.zones_items.insert(item);
            }
        }
    }

    fn into_tasks(self, reward: f64) -> Vec<Task> {
        let get = self
            .items
            .into_iter()
            .map(|item| Task::get_item(item).with_reward(reward));
        let go = self
            .zones
            .into_iter()
            .map(|zone| Task::go_to_zone(zone).with_reward(reward));
        let place = self
            .zones_items
            .into_iter()
            .map(|item| Task::place_item(item, None).with_reward(reward));
        get.chain(go).chain(place).collect()
    }
}

/// Subtasks rewarding progress towards `task` under `shaping`.
///
/// # Errors
///
/// Returns [`PurposeError::UnsupportedTaskType`] when `shaping` needs to
/// analyse the goal (required, inputs) and the goal is a custom one.
pub fn subtasks(
    task: &Task,
    shaping: RewardShaping,
    world: &World,
    reward: f64,
) -> Result<Vec<Task>, PurposeError> {
    let elements = match shaping {
        RewardShaping::None => return Ok(Vec::new()),
        RewardShaping::All => all_elements(world),
        RewardShaping::Required => required_elements(task, world)?,
        RewardShaping::Inputs => inputs_elements(task, world)?,
    };
    Ok(elements.into_tasks(reward))
}

fn all_elements(world: &World) -> Elements {
    Elements {
        items: world.items().iter().cloned().collect(),
        zones: world.zones().iter().cloned().collect(),
        zones_items: world.zones_items().iter().cloned().collect(),
    }
}

/// Everything the goal transitively depends on.
fn required_elements(task: &Task, world: &World) -> Result<Elements, PurposeError> {
    let mut elements = Elements::default();
    let goal_nodes = match task.goal() {
        Goal::GetItem(stack) => vec![Node::Item(stack.item.clone())],
        Goal::GoToZone(zone) => vec![Node::Zone(zone.clone())],
        Goal::PlaceItem { stack, zones } => {
            let mut nodes = vec![Node::ZoneItem(stack.item.clone())];
            for zone in zones.iter().flatten() {
                elements.zones.insert(zone.clone());
                nodes.push(Node::Zone(zone.clone()));
            }
            nodes
        }
        Goal::Custom(_) => return Err(unsupported(RewardShaping::Required, task)),
    };

    let graph = world.requirements();
    for node in &goal_nodes {
        for ancestor in graph.ancestors(node) {
            elements.insert(ancestor);
        }
    }
    Ok(elements)
}

/// What the transformations directly reaching the goal consume.
///
/// A transformation reaches a get-item or place-item goal if it produces the
/// item without consuming it, so accumulators (`x -> 2x`) are left out.
/// Moving to a goal zone always counts.
fn inputs_elements(task: &Task, world: &World) -> Result<Elements, PurposeError> {
    let mut elements = Elements::default();
    let graph = world.requirements();
    let mut reaching: BTreeSet<TransformationId> = BTreeSet::new();

    match task.goal() {
        Goal::GetItem(stack) => {
            let node = Node::Item(stack.item.clone());
            reaching.extend(graph.producers(&node).difference(&graph.consumers(&node)));
        }
        Goal::GoToZone(zone) => {
            reaching.extend(graph.producers(&Node::Zone(zone.clone())));
        }
        Goal::PlaceItem { stack, zones } => {
            let node = Node::ZoneItem(stack.item.clone());
            reaching.extend(graph.producers(&node).difference(&graph.consumers(&node)));
            for zone in zones.iter().flatten() {
                elements.zones.insert(zone.clone());
                reaching.extend(graph.producers(&Node::Zone(zone.clone())));
            }
        }
        Goal::Custom(_) => return Err(unsupported(RewardShaping::Inputs, task)),
    }

    for id in reaching {
        let Ok(transformation) = world.transformation(id) else {
            continue;
        };
        elements.items.extend(transformation.consumed_items());
        elements.zones_items.extend(transformation.consumed_zones_items());
        elements
            .zones
            .extend(transformation.zones().into_iter().flatten().cloned());
    }
    Ok(elements)
}

fn unsupported(shaping: RewardShaping, task: &Task) -> PurposeError {
    PurposeError::UnsupportedTaskType {
        shaping,
        task: task.name().to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crafting_types::ItemStack;
    use crafting_world::{InventoryOwner, Transformation};

    use super::*;

    /// search item0 ; item0 -> item1 ; item1 in zone1 -> item2 ; item2 -> 2 item2
    fn world() -> World {
        World::new(
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
                    .remove(InventoryOwner::Player, ItemStack::one("item2"))
                    .add(InventoryOwner::Player, ItemStack::new("item2", 2)),
                Transformation::new().to_zone("zone1"),
            ],
            None,
        )
        .unwrap()
    }

    fn names(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::name).collect()
    }

    #[test]
    fn none_adds_nothing() {
        let tasks = subtasks(&Task::get_item("item2"), RewardShaping::None, &world(), 1.0).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn all_covers_the_catalog() {
        let tasks = subtasks(&Task::get_item("item2"), RewardShaping::All, &world(), 1.0).unwrap();
        assert_eq!(
            names(&tasks),
            vec!["Get item0", "Get item1", "Get item2", "Go to zone1"]
        );
    }

    #[test]
    fn required_follows_ancestors() {
        let tasks =
            subtasks(&Task::get_item("item2"), RewardShaping::Required, &world(), 0.5).unwrap();
        assert_eq!(names(&tasks), vec!["Get item0", "Get item1", "Go to zone1"]);
        assert!(tasks.iter().all(|t| (t.reward() - 0.5).abs() < f64::EPSILON));
    }

    #[test]
    fn inputs_is_one_hop_and_skips_accumulators() {
        let tasks =
            subtasks(&Task::get_item("item2"), RewardShaping::Inputs, &world(), 1.0).unwrap();
        assert_eq!(names(&tasks), vec!["Get item1", "Go to zone1"]);
    }

    #[test]
    fn custom_goals_only_support_all() {
        #[derive(Debug)]
        struct Never;
        impl crate::task::CustomGoal for Never {
            fn name(&self) -> String {
                String::from("Never")
            }
            fn is_reached(&self, _snapshot: &crafting_types::Snapshot) -> bool {
                false
            }
        }
        let task = Task::custom(Never);
        for shaping in [RewardShaping::Required, RewardShaping::Inputs] {
            assert!(matches!(
                subtasks(&task, shaping, &world(), 1.0),
                Err(PurposeError::UnsupportedTaskType { .. })
            ));
        }
        assert_eq!(subtasks(&task, RewardShaping::All, &world(), 1.0).unwrap().len(), 4);
    }
}
