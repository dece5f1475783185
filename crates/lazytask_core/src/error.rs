//! Error model shared by relation containers and the entity store.
//!
//! # Invariants
//! - Every relation-consistency failure surfaces synchronously at the call
//!   site; nothing inside the core retries.
//! - `discard` of an absent member is not an error; strict `remove` is.

use crate::model::attribute::Attribute;
use crate::model::ids::{EntityKey, EntityKind};
use crate::relation::association::RelationSlot;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by relation and entity operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Caller passed a value the operation can never accept.
    InvalidArgument(&'static str),
    /// Strict removal of an item that is not a member.
    NotFound { slot: RelationSlot, item: EntityKey },
    /// Key does not address a live entity.
    EntityNotFound(EntityKey),
    /// Entity kind lacks the statically configured field for `slot`.
    MissingCounterpart {
        slot: &'static str,
        kind: EntityKind,
    },
    /// Attribute is absent on the kind or the value has the wrong type.
    Attribute {
        attribute: Attribute,
        kind: EntityKind,
    },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(details) => write!(f, "invalid argument: {details}"),
            Self::NotFound { slot, item } => {
                write!(f, "entity {item} is not a member of `{}`", slot.name())
            }
            Self::EntityNotFound(key) => write!(f, "entity not found: {key}"),
            Self::MissingCounterpart { slot, kind } => {
                write!(f, "{kind} has no field `{slot}` required by this relation")
            }
            Self::Attribute { attribute, kind } => write!(
                f,
                "{kind} has no attribute `{}` accepting this value",
                attribute.name()
            ),
        }
    }
}

impl Error for ModelError {}
