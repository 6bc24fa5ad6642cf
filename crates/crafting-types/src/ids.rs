//! Type-safe index wrappers for catalog entries.
//!
//! Transformations and tasks are addressed by their position in an
//! immutable list (the world catalog, the purpose task list). Wrapping the
//! raw `usize` prevents a transformation index from being passed where a
//! task index is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `usize` index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Create an identifier from a raw index.
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Return the inner index.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Position of a transformation in the world catalog (the action space).
    TransformationId
}

define_id! {
    /// Position of a task in a purpose's task list.
    TaskId
}
