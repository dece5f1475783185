//! Relation primitives: association descriptors and lazy containers.
//!
//! # Responsibility
//! - Declare which fields pair with which, statically.
//! - Provide the owner-bound container with deferred population.
//!
//! # Invariants
//! - Containers here never reach across entities; cross-entity rules live
//!   in `graph`.

pub mod association;
pub mod lazy;
