//! Integration tests for world construction and stepping.
//!
//! These drive the public API only: build preset and random worlds, step
//! them through legal transformations and check the invariants that every
//! consumer (goal layer, planners, renderers) relies on.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use crafting_types::{Item, TransformationId};
use crafting_world::presets::{self, unlock_pickup, wood_house};
use crafting_world::{
    InventoryOwner, Node, RandomWorldConfig, Transformation, World, WorldError, WorldState,
    random_world,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

/// Step a state through `steps` random legal transformations.
fn random_walk(state: &mut WorldState, steps: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..steps {
        let legal: Vec<TransformationId> = state.legal_transformations().into_iter().collect();
        let Some(id) = legal.choose(&mut rng).copied() else {
            break;
        };
        state.step(id).unwrap();
    }
}

#[test]
fn legal_transformations_always_apply() {
    for world in [wood_house().unwrap(), unlock_pickup().unwrap()] {
        let mut state = WorldState::new(Arc::new(world));
        random_walk(&mut state, 300, 42);
    }
    let world = random_world(&RandomWorldConfig::default(), 9).unwrap();
    let mut state = WorldState::new(Arc::new(world));
    random_walk(&mut state, 300, 9);
}

#[test]
fn illegal_steps_never_change_the_state() {
    let world = Arc::new(wood_house().unwrap());
    let mut state = WorldState::new(Arc::clone(&world));
    random_walk(&mut state, 50, 1);
    for (id, _) in world.enumerate_transformations() {
        if !state.is_legal(id).unwrap() {
            let before = state.snapshot();
            let err = state.step(id).unwrap_err();
            assert!(matches!(err, WorldError::IllegalTransformation { .. }));
            assert_eq!(state.snapshot(), before);
        }
    }
}

#[test]
fn worlds_ignore_transformation_order() {
    let mut shuffled = presets::unlock_pickup_transformations();
    shuffled.reverse();
    let a = unlock_pickup().unwrap();
    let b = World::new(shuffled, Some(presets::START_ROOM.into())).unwrap();
    assert_eq!(a.items(), b.items());
    assert_eq!(a.zones(), b.zones());
    assert_eq!(a.zones_items(), b.zones_items());
    assert!(a.requirements().nodes().eq(b.requirements().nodes()));
    assert!(a.requirements().edges().eq(b.requirements().edges()));
}

#[test]
fn snapshot_serializes_in_catalog_order() {
    let world = Arc::new(wood_house().unwrap());
    let mut state = WorldState::new(Arc::clone(&world));
    let search_wood = world
        .enumerate_transformations()
        .find(|(_, t)| t.name() == Some("search wood"))
        .map(|(id, _)| id)
        .unwrap();
    state.step(search_wood).unwrap();
    let json = serde_json::to_value(state.snapshot()).unwrap();
    // items: plank, stone, table, wood, wood house
    assert_eq!(json["player_inventory"], serde_json::json!([0, 0, 0, 1, 0]));
    assert_eq!(json["current_zone"], serde_json::json!(1));
}

#[test]
fn unlock_pickup_graph_has_a_pickup_cycle() {
    let world = unlock_pickup().unwrap();
    let graph = world.requirements();
    let key = Node::Item(Item::new(presets::KEY));
    assert!(graph
        .ancestors(&key)
        .contains(&Node::ZoneItem(Item::new(presets::KEY))));
    assert!(matches!(
        graph.levels(),
        Err(WorldError::RequirementsCycle { .. })
    ));
}

#[test]
fn wood_house_levels() {
    let world = wood_house().unwrap();
    let levels = world.requirements().levels().unwrap();
    assert_eq!(levels.get(&Node::Item(Item::new(presets::WOOD))), Some(&0));
    assert_eq!(levels.get(&Node::Item(Item::new(presets::PLANK))), Some(&1));
    assert_eq!(
        levels.get(&Node::ZoneItem(Item::new(presets::WOOD_HOUSE))),
        Some(&2)
    );
    assert_eq!(world.requirements().depth().unwrap(), 2);
}

#[test]
fn same_seed_same_random_world() {
    let config = RandomWorldConfig::default();
    let a = random_world(&config, 123).unwrap();
    let b = random_world(&config, 123).unwrap();
    assert_eq!(a.transformations(), b.transformations());
    assert!(a.requirements().edges().eq(b.requirements().edges()));
}

#[test]
fn catalyst_stays_in_inventory() {
    let world = World::new(
        vec![
            Transformation::new().add(InventoryOwner::Player, Item::new("pickaxe")),
            Transformation::new()
                .remove(InventoryOwner::Player, Item::new("pickaxe"))
                .add(InventoryOwner::Player, Item::new("pickaxe"))
                .add(InventoryOwner::Player, Item::new("stone")),
        ],
        None,
    )
    .unwrap();
    let mut state = WorldState::new(Arc::new(world));
    state.step(TransformationId::new(0)).unwrap();
    state.step(TransformationId::new(1)).unwrap();
    state.step(TransformationId::new(1)).unwrap();
    assert_eq!(state.player_inventory().quantity(&Item::new("pickaxe")), 1);
    assert_eq!(state.player_inventory().quantity(&Item::new("stone")), 2);
}
