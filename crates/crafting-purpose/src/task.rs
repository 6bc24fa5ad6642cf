//! Tasks: one goal predicate over snapshots, a reward and an ended flag.
//!
//! A [`Task`] is created unbound, from names only. [`Task::bind`] resolves
//! those names to catalog indices of a [`World`]; from then on the goal is
//! evaluated on numeric [`Snapshot`]s without any lookup. The task state
//! ([`TaskState`]) latches the first step the goal holds, and separately
//! whether the reward for it has been collected; both stick for the episode
//! and are only cleared by [`Task::reset`].

use crafting_types::{Item, ItemStack, Snapshot, Zone};
use crafting_world::World;

use crate::error::PurposeError;

/// A goal predicate supplied by an integrator.
pub trait CustomGoal: core::fmt::Debug + Send + Sync {
    /// Stable name; tasks are identified by it.
    fn name(&self) -> String;

    /// Resolve whatever the goal needs from the world. Called by
    /// [`Task::bind`].
    fn bind(&mut self, _world: &World) -> Result<(), PurposeError> {
        Ok(())
    }

    /// Whether the goal holds in `snapshot`.
    fn is_reached(&self, snapshot: &Snapshot) -> bool;
}

/// What a task asks for.
#[derive(Debug)]
pub enum Goal {
    /// The player holds at least the stack.
    GetItem(ItemStack),
    /// The player stands in the zone.
    GoToZone(Zone),
    /// The stack lies in the current zone, or in one of `zones` if given.
    PlaceItem {
        /// Item and quantity to place.
        stack: ItemStack,
        /// Candidate zones; `None` means the current zone.
        zones: Option<Vec<Zone>>,
    },
    /// An integrator-defined predicate.
    Custom(Box<dyn CustomGoal>),
}

impl Goal {
    /// Deterministic task name for this goal.
    pub fn name(&self) -> String {
        match self {
            Self::GetItem(stack) => format!("Get {stack}"),
            Self::GoToZone(zone) => format!("Go to {zone}"),
            Self::PlaceItem { stack, zones: None } => format!("Place {stack} anywhere"),
            Self::PlaceItem {
                stack,
                zones: Some(zones),
            } => {
                let names: Vec<&str> = zones.iter().map(Zone::name).collect();
                format!("Place {stack} in [{}]", names.join(","))
            }
            Self::Custom(goal) => goal.name(),
        }
    }
}

/// Whether a task is still running in the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Not reached yet.
    #[default]
    Pending,
    /// Reached at some step of this episode; the reward is still due.
    Ended,
    /// Reached, and the reward has been collected.
    Rewarded,
}

/// Goal resolved against a world catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    GetItem {
        item: usize,
        quantity: u32,
    },
    GoToZone {
        zone: usize,
    },
    PlaceItem {
        item: usize,
        quantity: u32,
        zones: Option<Vec<usize>>,
    },
    Custom,
}

/// A rewarded goal with a sticky ended flag.
#[derive(Debug)]
pub struct Task {
    name: String,
    goal: Goal,
    reward: f64,
    state: TaskState,
    binding: Option<Binding>,
}

impl Task {
    /// Create a task for `goal` with a reward of 1.
    pub fn new(goal: Goal) -> Self {
        Self {
            name: goal.name(),
            goal,
            reward: 1.0,
            state: TaskState::Pending,
            binding: None,
        }
    }

    /// Obtain a stack (or a single item) in the player inventory.
    pub fn get_item(stack: impl Into<ItemStack>) -> Self {
        Self::new(Goal::GetItem(stack.into()))
    }

    /// Reach a zone.
    pub fn go_to_zone(zone: impl Into<Zone>) -> Self {
        Self::new(Goal::GoToZone(zone.into()))
    }

    /// Place a stack in the current zone, or in any of `zones`.
    pub fn place_item(stack: impl Into<ItemStack>, zones: Option<Vec<Zone>>) -> Self {
        Self::new(Goal::PlaceItem {
            stack: stack.into(),
            zones,
        })
    }

    /// Wrap an integrator-defined goal.
    pub fn custom(goal: impl CustomGoal + 'static) -> Self {
        Self::new(Goal::Custom(Box::new(goal)))
    }

    /// Set the reward granted when the goal is first reached.
    #[must_use]
    pub const fn with_reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// Name identifying the task inside a purpose.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The goal.
    pub const fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Reward granted on completion.
    pub const fn reward(&self) -> f64 {
        self.reward
    }

    /// Current episode state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Whether the goal has been reached during this episode.
    pub fn has_ended(&self) -> bool {
        self.state != TaskState::Pending
    }

    /// Whether the task has been bound to a world.
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Resolve the goal against `world`.
    ///
    /// # Errors
    ///
    /// Returns [`PurposeError::UnknownItem`] or [`PurposeError::UnknownZone`]
    /// when the goal names something outside the catalog. A place task needs
    /// an item that can lie in a zone. Get and place goals asking for zero
    /// items fail with [`PurposeError::ZeroQuantity`].
    pub fn bind(&mut self, world: &World) -> Result<(), PurposeError> {
        if let Goal::GetItem(stack) | Goal::PlaceItem { stack, .. } = &self.goal
            && stack.quantity == 0
        {
            return Err(PurposeError::ZeroQuantity {
                task: self.name.clone(),
            });
        }
        let binding = match &mut self.goal {
            Goal::GetItem(stack) => Binding::GetItem {
                item: item_index(&self.name, world, &stack.item, World::item_index)?,
                quantity: stack.quantity,
            },
            Goal::GoToZone(zone) => Binding::GoToZone {
                zone: zone_index(&self.name, world, zone)?,
            },
            Goal::PlaceItem { stack, zones } => Binding::PlaceItem {
                item: item_index(&self.name, world, &stack.item, World::zone_item_index)?,
                quantity: stack.quantity,
                zones: zones
                    .as_ref()
                    .map(|zones| {
                        zones
                            .iter()
                            .map(|zone| zone_index(&self.name, world, zone))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .transpose()?,
            },
            Goal::Custom(goal) => {
                goal.bind(world)?;
                Binding::Custom
            }
        };
        self.binding = Some(binding);
        Ok(())
    }

    /// Evaluate the goal predicate. An unbound task never holds.
    pub fn is_reached(&self, snapshot: &Snapshot) -> bool {
        match &self.binding {
            None => false,
            Some(Binding::GetItem { item, quantity }) => {
                snapshot.player_quantity(*item) >= *quantity
            }
            Some(Binding::GoToZone { zone }) => snapshot.current_zone == Some(*zone),
            Some(Binding::PlaceItem {
                item,
                quantity,
                zones: Some(zones),
            }) => zones
                .iter()
                .any(|zone| snapshot.zone_quantity(*zone, *item) >= *quantity),
            Some(Binding::PlaceItem {
                item,
                quantity,
                zones: None,
            }) => snapshot
                .current_zone
                .is_some_and(|zone| snapshot.zone_quantity(zone, *item) >= *quantity),
            Some(Binding::Custom) => match &self.goal {
                Goal::Custom(goal) => goal.is_reached(snapshot),
                _ => false,
            },
        }
    }

    /// Flag the task as ended if its goal holds. Returns `true` only on the
    /// step the flag flips.
    pub fn update(&mut self, snapshot: &Snapshot) -> bool {
        if self.has_ended() || !self.is_reached(snapshot) {
            return false;
        }
        self.state = TaskState::Ended;
        true
    }

    /// Collect the reward of an ended task. Pays once per episode; zero
    /// while pending or once collected.
    pub const fn take_reward(&mut self) -> f64 {
        match self.state {
            TaskState::Ended => {
                self.state = TaskState::Rewarded;
                self.reward
            }
            TaskState::Pending | TaskState::Rewarded => 0.0,
        }
    }

    /// Clear the ended flag for a new episode.
    pub const fn reset(&mut self) {
        self.state = TaskState::Pending;
    }
}

impl core::fmt::Display for Task {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

fn item_index(
    task: &str,
    world: &World,
    item: &Item,
    lookup: fn(&World, &Item) -> Result<usize, crafting_world::WorldError>,
) -> Result<usize, PurposeError> {
    lookup(world, item)
        .ok()
        .ok_or_else(|| PurposeError::UnknownItem {
            task: task.to_owned(),
            item: item.clone(),
        })
}

fn zone_index(task: &str, world: &World, zone: &Zone) -> Result<usize, PurposeError> {
    world
        .zone_index(zone)
        .ok()
        .ok_or_else(|| PurposeError::UnknownZone {
            task: task.to_owned(),
            zone: zone.clone(),
        })
}
