//! Domain model for tasks, tags, notes, attachments and users.
//!
//! # Responsibility
//! - Define entity identity, attributes and typed relation fields.
//!
//! # Invariants
//! - Every entity is identified by a stable, non-nil `EntityKey`.
//! - The persistent integer id is optional and assigned by storage.

pub mod attribute;
pub mod entity;
pub mod ids;
