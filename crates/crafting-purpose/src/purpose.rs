//! Purposes: tasks, terminal groups and per-step reward.
//!
//! A [`Purpose`] owns an ordered task list. Every task may belong to any
//! number of named terminal groups; the purpose is terminal as soon as every
//! task of at least one group has ended. Tasks in no group are optional:
//! they are rewarded but never end the episode.
//!
//! [`Purpose::build`] binds the tasks to a world and appends the shaping
//! subtasks requested for each of them. Subtasks are optional and unshaped,
//! so building never recurses and never changes when the purpose ends.

use std::collections::BTreeSet;

use crafting_types::{Snapshot, TaskId};
use crafting_world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PurposeError;
use crate::shaping;
use crate::task::Task;

/// Name of the group tasks join when added without explicit groups.
pub const DEFAULT_GROUP: &str = "default";

/// Reward-shaping strategy attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardShaping {
    /// No subtask.
    #[default]
    None,
    /// One subtask per item, zone and zone item of the world.
    All,
    /// One subtask per element the goal transitively requires.
    Required,
    /// One subtask per element directly consumed to reach the goal.
    Inputs,
}

impl core::fmt::Display for RewardShaping {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::All => "all",
            Self::Required => "required",
            Self::Inputs => "inputs",
        })
    }
}

/// Terminal groups a task joins when added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TerminalGroups {
    /// The [`DEFAULT_GROUP`].
    #[default]
    Default,
    /// The given groups; an empty list makes the task optional.
    Named(Vec<String>),
    /// No group at all.
    Optional,
}

impl TerminalGroups {
    /// A single named group.
    pub fn named(group: impl Into<String>) -> Self {
        Self::Named(vec![group.into()])
    }

    fn names(self) -> Vec<String> {
        match self {
            Self::Default => vec![String::from(DEFAULT_GROUP)],
            Self::Named(groups) => groups,
            Self::Optional => Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    task: Task,
    shaping: RewardShaping,
}

/// Ordered tasks with terminal groups and shaping settings.
#[derive(Debug)]
pub struct Purpose {
    entries: Vec<Entry>,
    /// Groups in creation order, each listing its members in insertion order.
    groups: Vec<(String, Vec<TaskId>)>,
    timestep_reward: f64,
    shaping_value: f64,
    default_shaping: RewardShaping,
    built: bool,
}

impl Default for Purpose {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Purpose {
    /// Create an empty purpose with a per-step reward (negative for a time
    /// penalty).
    pub const fn new(timestep_reward: f64) -> Self {
        Self {
            entries: Vec::new(),
            groups: Vec::new(),
            timestep_reward,
            shaping_value: 1.0,
            default_shaping: RewardShaping::None,
            built: false,
        }
    }

    /// Shaping applied to tasks added without an explicit one.
    #[must_use]
    pub const fn with_default_shaping(mut self, shaping: RewardShaping) -> Self {
        self.default_shaping = shaping;
        self
    }

    /// Reward of each shaping subtask.
    #[must_use]
    pub const fn with_shaping_value(mut self, value: f64) -> Self {
        self.shaping_value = value;
        self
    }

    /// Add a task with the default shaping, in the default group.
    ///
    /// # Errors
    ///
    /// Returns [`PurposeError::DuplicateTask`] if a task with the same name
    /// is already present.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId, PurposeError> {
        self.add_task_with(task, None, TerminalGroups::Default)
    }

    /// Add a task with explicit shaping and terminal groups.
    ///
    /// # Errors
    ///
    /// Returns [`PurposeError::DuplicateTask`] if a task with the same name
    /// is already present.
    pub fn add_task_with(
        &mut self,
        task: Task,
        shaping: Option<RewardShaping>,
        groups: TerminalGroups,
    ) -> Result<TaskId, PurposeError> {
        if self.position(task.name()).is_some() {
            return Err(PurposeError::DuplicateTask(task.name().to_owned()));
        }
        let shaping = shaping.unwrap_or(self.default_shaping);
        Ok(self.push(task, shaping, groups))
    }

    fn push(&mut self, task: Task, shaping: RewardShaping, groups: TerminalGroups) -> TaskId {
        let id = TaskId::new(self.entries.len());
        for group in groups.names() {
            match self.groups.iter_mut().find(|(name, _)| *name == group) {
                Some((_, members)) => members.push(id),
                None => self.groups.push((group, vec![id])),
            }
        }
        self.entries.push(Entry { task, shaping });
        id
    }

    fn position(&self, name: &str) -> Option<TaskId> {
        self.entries
            .iter()
            .position(|entry| entry.task.name() == name)
            .map(TaskId::new)
    }

    // -------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------

    /// Bind every task to `world` and append shaping subtasks.
    ///
    /// Subtasks whose name matches an existing task are skipped. Calling
    /// `build` again on a built purpose only rebinds the tasks. On error the
    /// task list is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`PurposeError::UnknownItem`] or [`PurposeError::UnknownZone`]
    /// for goals outside the world, and
    /// [`PurposeError::UnsupportedTaskType`] for shaping a custom goal.
    pub fn build(&mut self, world: &World) -> Result<(), PurposeError> {
        for entry in &mut self.entries {
            entry.task.bind(world)?;
        }
        if self.built {
            return Ok(());
        }

        let mut pending: Vec<Task> = Vec::new();
        for entry in &self.entries {
            let subtasks = shaping::subtasks(&entry.task, entry.shaping, world, self.shaping_value)?;
            debug!(
                task = %entry.task,
                shaping = %entry.shaping,
                subtasks = subtasks.len(),
                "Shaping subtasks synthesized"
            );
            pending.extend(subtasks);
        }

        let mut added = 0_usize;
        for mut subtask in pending {
            if self.position(subtask.name()).is_some() {
                continue;
            }
            subtask.bind(world)?;
            self.push(subtask, RewardShaping::None, TerminalGroups::Optional);
            added = added.saturating_add(1);
        }

        self.built = true;
        info!(
            tasks = self.entries.len(),
            shaping_subtasks = added,
            groups = self.groups.len(),
            "Purpose built"
        );
        Ok(())
    }

    /// Whether [`Purpose::build`] has run.
    pub const fn is_built(&self) -> bool {
        self.built
    }

    // -------------------------------------------------------------------
    // Per-step queries
    // -------------------------------------------------------------------

    /// Reward for reaching `snapshot`: the timestep reward plus the reward of
    /// every task reached in this episode whose reward has not been paid.
    ///
    /// Each task pays once per episode, whichever of `reward` and
    /// [`Purpose::is_terminal`] sees it reach its goal first.
    pub fn reward(&mut self, snapshot: &Snapshot) -> f64 {
        self.update_tasks(snapshot);
        self.entries
            .iter_mut()
            .map(|entry| entry.task.take_reward())
            .fold(self.timestep_reward, |total, reward| total + reward)
    }

    /// Flag newly ended tasks, then check the terminal groups.
    pub fn is_terminal(&mut self, snapshot: &Snapshot) -> bool {
        self.update_tasks(snapshot);
        self.groups.iter().any(|(_, members)| {
            members.iter().all(|id| {
                self.entries
                    .get(id.index())
                    .is_some_and(|entry| entry.task.has_ended())
            })
        })
    }

    fn update_tasks(&mut self, snapshot: &Snapshot) {
        for entry in &mut self.entries {
            if entry.task.update(snapshot) {
                info!(task = %entry.task, reward = entry.task.reward(), "Task completed");
            }
        }
    }

    /// Reward and terminal flag for one step.
    pub fn evaluate(&mut self, snapshot: &Snapshot) -> (f64, bool) {
        let reward = self.reward(snapshot);
        (reward, self.is_terminal(snapshot))
    }

    /// Clear every ended flag for a new episode.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.task.reset();
        }
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    /// All tasks in insertion order (subtasks last).
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter().map(|entry| &entry.task)
    }

    /// Look up a task.
    pub fn task(&self, id: TaskId) -> Result<&Task, PurposeError> {
        self.entries
            .get(id.index())
            .map(|entry| &entry.task)
            .ok_or(PurposeError::UnknownTask(id))
    }

    /// Shaping strategy of a task.
    pub fn shaping_of(&self, id: TaskId) -> Result<RewardShaping, PurposeError> {
        self.entries
            .get(id.index())
            .map(|entry| entry.shaping)
            .ok_or(PurposeError::UnknownTask(id))
    }

    /// Number of tasks, subtasks included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the purpose has no task.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terminal groups in creation order with their member tasks.
    pub fn terminal_groups(&self) -> impl Iterator<Item = (&str, Vec<&Task>)> {
        self.groups.iter().map(|(name, members)| {
            let tasks = members
                .iter()
                .filter_map(|id| self.entries.get(id.index()))
                .map(|entry| &entry.task)
                .collect();
            (name.as_str(), tasks)
        })
    }

    /// Tasks that belong to no terminal group.
    pub fn optional_tasks(&self) -> Vec<&Task> {
        let grouped: BTreeSet<TaskId> = self
            .groups
            .iter()
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        self.entries
            .iter()
            .enumerate()
            .filter(|(index, _)| !grouped.contains(&TaskId::new(*index)))
            .map(|(_, entry)| &entry.task)
            .collect()
    }

    /// Per-step reward added regardless of tasks.
    pub const fn timestep_reward(&self) -> f64 {
        self.timestep_reward
    }

    /// Reward of each shaping subtask.
    pub const fn shaping_value(&self) -> f64 {
        self.shaping_value
    }

    /// Shaping used when none is given.
    pub const fn default_shaping(&self) -> RewardShaping {
        self.default_shaping
    }

    fn tasks_label(&self, ids: impl Iterator<Item = TaskId>) -> String {
        ids.filter_map(|id| self.entries.get(id.index()))
            .map(|entry| match entry.shaping {
                RewardShaping::None => entry.task.to_string(),
                shaping => format!("{}#{shaping}", entry.task),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Task> for Purpose {
    fn from(task: Task) -> Self {
        let mut purpose = Self::default();
        purpose.push(task, RewardShaping::None, TerminalGroups::Default);
        purpose
    }
}

impl core::fmt::Display for Purpose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut parts: Vec<String> = self
            .groups
            .iter()
            .map(|(name, members)| format!("{name}:[{}]", self.tasks_label(members.iter().copied())))
            .collect();
        let grouped: BTreeSet<TaskId> = self
            .groups
            .iter()
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        let optional: Vec<TaskId> = (0..self.entries.len())
            .map(TaskId::new)
            .filter(|id| !grouped.contains(id))
            .collect();
        if !optional.is_empty() {
            parts.push(format!("optional:[{}]", self.tasks_label(optional.into_iter())));
        }
        write!(f, "Purpose({})", parts.join(", "))
    }
}
