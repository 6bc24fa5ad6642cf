//! Seeded procedural crafting trees.
//!
//! Items are named `<inputs>_<index>`. Items with zero inputs can be searched
//! for directly; every other item gets one recipe consuming distinct items
//! that were already reachable when it was added, so every item of a random
//! world is obtainable. All randomness is drawn from a [`StdRng`] seeded by
//! the caller, at construction time only.

use std::collections::BTreeMap;

use crafting_types::Item;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::transformation::{InventoryOwner, Transformation};
use crate::world::World;

/// Shape of a random crafting tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWorldConfig {
    /// Number of items for each number of recipe inputs.
    pub items_per_inputs: BTreeMap<usize, usize>,
}

impl Default for RandomWorldConfig {
    fn default() -> Self {
        Self {
            items_per_inputs: BTreeMap::from([(0, 5), (1, 5), (2, 10), (3, 5)]),
        }
    }
}

impl RandomWorldConfig {
    /// Total number of items the generated world will contain.
    pub fn item_count(&self) -> usize {
        self.items_per_inputs
            .values()
            .fold(0_usize, |total, count| total.saturating_add(*count))
    }

    /// Short label such as `0I5-1I5-2I10-3I5`.
    pub fn label(&self) -> String {
        self.items_per_inputs
            .iter()
            .map(|(inputs, count)| format!("{inputs}I{count}"))
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Generate the transformations of a random world.
pub fn random_transformations(config: &RandomWorldConfig, seed: u64) -> Vec<Transformation> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut accessible: Vec<(Item, usize)> = Vec::new();
    let mut locked: Vec<(Item, usize)> = Vec::new();
    for (&inputs, &count) in &config.items_per_inputs {
        for index in 0..count {
            let item = Item::new(format!("{inputs}_{index}"));
            if inputs == 0 {
                accessible.push((item, inputs));
            } else {
                locked.push((item, inputs));
            }
        }
    }

    let mut transformations: Vec<Transformation> = accessible
        .iter()
        .map(|(item, _)| {
            Transformation::new()
                .named(format!("search {item}"))
                .add(InventoryOwner::Player, item)
        })
        .collect();

    locked.shuffle(&mut rng);
    while let Some((item, inputs)) = locked.pop() {
        let picked = pick_distinct(&mut rng, accessible.len(), inputs);
        let mut recipe = Transformation::new().named(format!("craft {item}"));
        for index in picked {
            if let Some((input, _)) = accessible.get(index) {
                recipe = recipe.remove(InventoryOwner::Player, input);
            }
        }
        transformations.push(recipe.add(InventoryOwner::Player, &item));
        accessible.push((item, inputs));
    }

    debug!(seed, label = %config.label(), transformations = transformations.len(), "Random transformations generated");
    transformations
}

/// Build a random world. Identical configs and seeds give identical worlds.
pub fn random_world(config: &RandomWorldConfig, seed: u64) -> Result<World, WorldError> {
    World::new(random_transformations(config, seed), None)
}

/// Pick `count` distinct indices below `len` (fewer if `len` is smaller).
///
/// Fisher-Yates partial shuffle over an index array.
fn pick_distinct(rng: &mut impl Rng, len: usize, count: usize) -> Vec<usize> {
    let count = count.min(len);
    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..count {
        let j = rng.random_range(i..len);
        indices.swap(i, j);
    }
    indices.truncate(count);
    indices
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn default_config_has_twenty_five_items() {
        let config = RandomWorldConfig::default();
        assert_eq!(config.item_count(), 25);
        assert_eq!(config.label(), "0I5-1I5-2I10-3I5");
    }

    #[test]
    fn same_seed_same_world() {
        let config = RandomWorldConfig::default();
        assert_eq!(
            random_transformations(&config, 7),
            random_transformations(&config, 7)
        );
    }

    #[test]
    fn different_seeds_usually_differ() {
        let config = RandomWorldConfig::default();
        let worlds: BTreeSet<String> = (0..8)
            .map(|seed| {
                random_transformations(&config, seed)
                    .iter()
                    .map(|t| format!("{:?}", t.consumed_items()))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect();
        assert!(worlds.len() > 1);
    }

    #[test]
    fn every_item_has_exactly_one_producer() {
        let config = RandomWorldConfig::default();
        let world = random_world(&config, 3).unwrap();
        assert_eq!(world.items().len(), 25);
        assert_eq!(world.transformation_count(), 25);
        for item in world.items() {
            let producers = world
                .transformations()
                .iter()
                .filter(|t| t.produced_items().contains(item))
                .count();
            assert_eq!(producers, 1, "{item}");
        }
    }

    #[test]
    fn recipes_use_the_declared_number_of_inputs() {
        let config = RandomWorldConfig {
            items_per_inputs: BTreeMap::from([(0, 3), (2, 4)]),
        };
        for transformation in random_transformations(&config, 11) {
            let produced = transformation.produced_items();
            let item = produced.first().unwrap();
            let expected = if item.name().starts_with("0_") { 0 } else { 2 };
            assert_eq!(transformation.consumed_items().len(), expected);
        }
    }

    #[test]
    fn random_trees_are_acyclic() {
        let world = random_world(&RandomWorldConfig::default(), 5).unwrap();
        assert!(world.requirements().depth().unwrap() >= 1);
    }

    #[test]
    fn inputs_are_capped_by_accessible_items() {
        let config = RandomWorldConfig {
            items_per_inputs: BTreeMap::from([(0, 1), (3, 1)]),
        };
        let transformations = random_transformations(&config, 0);
        let recipe = transformations.get(1).unwrap();
        assert_eq!(recipe.consumed_items().len(), 1);
    }
}
