//! Entity arena and the relation rules operating across entities.
//!
//! # Responsibility
//! - Own entities and route every relation mutation through one place.
//! - Keep both sides of each association consistent within one call.
//!
//! # Invariants
//! - One-to-Many: item in owner's container <=> item's reference is owner.
//! - Many-to-Many: B in A's relation <=> A in B's counterpart.

pub mod cycle;
pub mod draft;
mod many_to_many;
mod one_to_many;
pub mod store;
