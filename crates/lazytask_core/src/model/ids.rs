//! Entity identity and kind tags.
//!
//! # Responsibility
//! - Define the stable arena identity every relation keys on.
//! - Name the entity kinds that relation descriptors are checked against.
//!
//! # Invariants
//! - `EntityKey` raw value `0` is the nil key and never addresses an entity.
//! - Keys are never reused inside one `EntityStore`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable in-memory identity of one entity.
///
/// Opaque to callers apart from equality, hashing and ordering. It is
/// independent from the nullable persistent id assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u64);

impl EntityKey {
    /// Reserved key that never addresses an entity.
    pub const NIL: Self = Self(0);

    /// Wraps a raw key value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw key value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns whether this is the reserved nil key.
    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Domain entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Actionable task.
    Task,
    /// Label shared by many tasks.
    Tag,
    /// Free-form note attached to one task.
    Note,
    /// File reference attached to one task.
    Attachment,
    /// Account owning tasks and tags.
    User,
}

impl EntityKind {
    /// Stable lowercase name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Tag => "tag",
            Self::Note => "note",
            Self::Attachment => "attachment",
            Self::User => "user",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
