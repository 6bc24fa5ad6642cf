//! Decision source trait and built-in implementations.
//!
//! On every step the runner presents the current [`Observation`] (snapshot
//! plus legality vector) and asks for the next transformation. The
//! [`DecisionSource`] trait abstracts the mechanism by which decisions are
//! obtained -- a renderer forwarding user input, a learned policy, a planner
//! or a test stub. Returning `None` means no input was made and ends the
//! episode.

use std::collections::VecDeque;

use crafting_types::{Observation, TransformationId};
use crafting_world::World;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Errors that can occur while setting up a decision source.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// A plan step names no transformation of the world.
    #[error("no transformation named {name:?}")]
    UnknownTransformation {
        /// The name that did not resolve.
        name: String,
    },
}

/// A source of decisions for the acting player.
pub trait DecisionSource {
    /// Choose the transformation to apply next, or `None` to stop.
    fn choose(&mut self, observation: &Observation) -> Option<TransformationId>;
}

/// Picks uniformly among legal transformations.
///
/// All randomness comes from a seeded [`StdRng`], so equal seeds replay the
/// same episode.
#[derive(Debug, Clone)]
pub struct RandomDecisionSource {
    rng: StdRng,
}

impl RandomDecisionSource {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomDecisionSource {
    fn choose(&mut self, observation: &Observation) -> Option<TransformationId> {
        let legal: Vec<TransformationId> = observation.legal_ids().collect();
        legal.choose(&mut self.rng).copied()
    }
}

/// Replays a fixed plan, one transformation per step.
///
/// The plan is not checked against legality; an illegal step surfaces as an
/// error from the environment. The source returns `None` once the plan is
/// exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionSource {
    plan: VecDeque<TransformationId>,
}

impl ScriptedDecisionSource {
    /// Create a source replaying `plan`.
    pub fn new(plan: impl IntoIterator<Item = TransformationId>) -> Self {
        Self {
            plan: plan.into_iter().collect(),
        }
    }

    /// Resolve a plan given as transformation names.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::UnknownTransformation`] for a name that no
    /// transformation of `world` carries.
    pub fn from_names<'a>(
        world: &World,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, DecisionError> {
        let plan = names
            .into_iter()
            .map(|name| {
                world
                    .enumerate_transformations()
                    .find(|(_, transformation)| transformation.name() == Some(name))
                    .map(|(id, _)| id)
                    .ok_or_else(|| DecisionError::UnknownTransformation {
                        name: name.to_owned(),
                    })
            })
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { plan })
    }

    /// Steps left to replay.
    pub fn remaining(&self) -> usize {
        self.plan.len()
    }
}

impl DecisionSource for ScriptedDecisionSource {
    fn choose(&mut self, _observation: &Observation) -> Option<TransformationId> {
        self.plan.pop_front()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crafting_world::presets;

    use super::*;

    fn observation(legal: Vec<bool>) -> Observation {
        Observation {
            legal_actions: legal,
            ..Observation::default()
        }
    }

    #[test]
    fn random_source_only_picks_legal_actions() {
        let mut source = RandomDecisionSource::new(3);
        let observation = observation(vec![false, true, false, true]);
        for _ in 0..50 {
            let id = source.choose(&observation).unwrap();
            assert!(observation.is_legal(id));
        }
    }

    #[test]
    fn random_source_gives_up_without_legal_actions() {
        let mut source = RandomDecisionSource::new(3);
        assert_eq!(source.choose(&observation(vec![false, false])), None);
    }

    #[test]
    fn random_source_is_reproducible() {
        let observation = observation(vec![true; 8]);
        let mut a = RandomDecisionSource::new(11);
        let mut b = RandomDecisionSource::new(11);
        for _ in 0..20 {
            assert_eq!(a.choose(&observation), b.choose(&observation));
        }
    }

    #[test]
    fn scripted_source_replays_then_stops() {
        let mut source =
            ScriptedDecisionSource::new([TransformationId::new(2), TransformationId::new(0)]);
        let observation = observation(Vec::new());
        assert_eq!(source.choose(&observation), Some(TransformationId::new(2)));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.choose(&observation), Some(TransformationId::new(0)));
        assert_eq!(source.choose(&observation), None);
    }

    #[test]
    fn scripted_source_resolves_names() {
        let world = presets::wood_house().unwrap();
        let source =
            ScriptedDecisionSource::from_names(&world, ["search wood", "craft plank"]).unwrap();
        assert_eq!(source.remaining(), 2);
        assert!(matches!(
            ScriptedDecisionSource::from_names(&world, ["fly"]),
            Err(DecisionError::UnknownTransformation { .. })
        ));
    }
}
