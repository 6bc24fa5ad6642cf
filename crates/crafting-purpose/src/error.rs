//! Error types for the `crafting-purpose` crate.

use crafting_types::{Item, TaskId, Zone};

use crate::purpose::RewardShaping;

/// Errors raised while building or querying a purpose.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurposeError {
    /// A task names an item the world does not know (or, for a place task,
    /// an item that never lies in a zone).
    #[error("task {task}: unknown item {item}")]
    UnknownItem {
        /// Name of the task.
        task: String,
        /// The unresolved item.
        item: Item,
    },

    /// A task names a zone the world does not know.
    #[error("task {task}: unknown zone {zone}")]
    UnknownZone {
        /// Name of the task.
        task: String,
        /// The unresolved zone.
        zone: Zone,
    },

    /// A get or place goal asks for zero items.
    #[error("task {task}: goal quantity must be at least 1")]
    ZeroQuantity {
        /// Name of the task.
        task: String,
    },

    /// A shaping strategy was requested for a task it cannot analyse.
    #[error("reward shaping {shaping} does not support task {task}")]
    UnsupportedTaskType {
        /// The requested shaping.
        shaping: RewardShaping,
        /// Name of the task.
        task: String,
    },

    /// A task with the same name is already part of the purpose.
    #[error("duplicate task: {0}")]
    DuplicateTask(String),

    /// A task identifier outside the purpose.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
}
