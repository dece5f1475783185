//! Lazily populated relation container.
//!
//! # Responsibility
//! - Hold the member keys of one relation field of one owner.
//! - Defer initial membership to a `RelationLoader` until first use.
//!
//! # Invariants
//! - The loader is consumed at most once, and fully merged before the
//!   triggering call returns.
//! - Every observing or mutating call populates first; `Debug` never does.
//! - Raw primitives never touch a counterpart; consistency is the caller's
//!   job (`EntityStore`).

use crate::error::{ModelError, ModelResult};
use crate::model::ids::EntityKey;
use log::debug;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

/// Supplier of a container's initial membership.
///
/// Implemented by the persistence collaborator when it reconstructs an
/// entity without eagerly loading every relation.
pub trait RelationLoader {
    /// Produces the initial member keys. Called at most once.
    fn load(self: Box<Self>) -> Vec<EntityKey>;
}

/// Loader over a membership list that is already in memory.
#[derive(Debug, Clone, Default)]
pub struct PreloadedMembers(pub Vec<EntityKey>);

impl RelationLoader for PreloadedMembers {
    fn load(self: Box<Self>) -> Vec<EntityKey> {
        self.0
    }
}

/// Population state of a container, observable without populating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// A deferred source is still pending.
    Unloaded,
    /// The backing store is authoritative.
    Loaded,
}

/// Set-like container of related entity keys owned by one entity.
pub struct LazyRelation {
    owner: EntityKey,
    pending: Option<Box<dyn RelationLoader>>,
    members: BTreeSet<EntityKey>,
}

impl LazyRelation {
    /// Creates a container, optionally backed by a deferred source.
    ///
    /// # Errors
    /// - `InvalidArgument` when `owner` is the nil key.
    pub fn new(owner: EntityKey, loader: Option<Box<dyn RelationLoader>>) -> ModelResult<Self> {
        if owner.is_nil() {
            return Err(ModelError::InvalidArgument(
                "relation container requires an owner",
            ));
        }
        Ok(Self {
            owner,
            pending: loader,
            members: BTreeSet::new(),
        })
    }

    /// Creates an already loaded, empty container.
    pub fn empty(owner: EntityKey) -> ModelResult<Self> {
        Self::new(owner, None)
    }

    /// Creates a container whose membership comes from `loader`.
    pub fn deferred(owner: EntityKey, loader: Box<dyn RelationLoader>) -> ModelResult<Self> {
        Self::new(owner, Some(loader))
    }

    pub fn owner(&self) -> EntityKey {
        self.owner
    }

    /// Reports population state without populating.
    pub fn state(&self) -> LoadState {
        if self.pending.is_some() {
            LoadState::Unloaded
        } else {
            LoadState::Loaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// Replaces any pending source. Only meaningful before first use.
    pub(crate) fn defer_to(&mut self, loader: Box<dyn RelationLoader>) {
        self.pending = Some(loader);
    }

    /// Single transition point from unloaded to loaded.
    fn loaded(&mut self) -> &mut BTreeSet<EntityKey> {
        if let Some(loader) = self.pending.take() {
            let before = self.members.len();
            self.members.extend(loader.load());
            debug!(
                "event=relation_populate module=relation status=ok owner={} loaded={}",
                self.owner,
                self.members.len() - before
            );
        }
        &mut self.members
    }

    pub fn len(&mut self) -> usize {
        self.loaded().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.loaded().is_empty()
    }

    pub fn contains(&mut self, item: EntityKey) -> bool {
        self.loaded().contains(&item)
    }

    /// Iterates members in key order.
    pub fn iter(&mut self) -> btree_set::Iter<'_, EntityKey> {
        self.loaded().iter()
    }

    /// Snapshot of the members, for callers that mutate while walking.
    pub fn members(&mut self) -> Vec<EntityKey> {
        self.loaded().iter().copied().collect()
    }

    /// Inserts into the backing store only. Returns whether it was absent.
    pub fn raw_add(&mut self, item: EntityKey) -> bool {
        self.loaded().insert(item)
    }

    /// Removes from the backing store only. Returns whether it was present.
    pub fn raw_discard(&mut self, item: EntityKey) -> bool {
        self.loaded().remove(&item)
    }
}

impl Debug for LazyRelation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("LazyRelation");
        out.field("owner", &self.owner);
        if self.pending.is_some() {
            out.field("members", &format_args!("<deferred>"));
        } else {
            out.field("members", &self.members);
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyRelation, LoadState, PreloadedMembers};
    use crate::error::ModelError;
    use crate::model::ids::EntityKey;

    fn key(raw: u64) -> EntityKey {
        EntityKey::from_raw(raw)
    }

    #[test]
    fn nil_owner_is_rejected() {
        let err = LazyRelation::empty(EntityKey::NIL).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
    }

    #[test]
    fn raw_primitives_report_membership_change() {
        let mut relation = LazyRelation::empty(key(1)).unwrap();
        assert!(relation.raw_add(key(2)));
        assert!(!relation.raw_add(key(2)));
        assert!(relation.raw_discard(key(2)));
        assert!(!relation.raw_discard(key(2)));
        assert!(relation.is_empty());
    }

    #[test]
    fn raw_add_merges_with_deferred_members() {
        let loader = Box::new(PreloadedMembers(vec![key(3), key(4)]));
        let mut relation = LazyRelation::deferred(key(1), loader).unwrap();
        relation.raw_add(key(5));
        assert_eq!(relation.members(), vec![key(3), key(4), key(5)]);
    }

    #[test]
    fn debug_output_keeps_source_pending() {
        let loader = Box::new(PreloadedMembers(vec![key(9)]));
        let mut relation = LazyRelation::deferred(key(1), loader).unwrap();

        let printed = format!("{relation:?}");
        assert!(printed.contains("<deferred>"));
        assert_eq!(relation.state(), LoadState::Unloaded);

        assert!(relation.contains(key(9)));
        assert!(format!("{relation:?}").contains("EntityKey(9)"));
    }
}
