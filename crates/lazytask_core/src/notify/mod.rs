//! Change-notification protocol surrounding every entity mutation.
//!
//! # Responsibility
//! - Deliver `on_changing` / `on_changed` hooks to subscribed listeners.
//! - Provide `ChangeRecorder`, a dirty-tracking listener.
//!
//! # Invariants
//! - Hooks fire synchronously, once per observable mutation, changing first.
//! - A no-op mutation fires nothing; callers check before notifying.
//! - Listeners are delivered to in subscription order.

use crate::model::attribute::{Attribute, FieldValue};
use crate::model::ids::EntityKey;
use crate::relation::association::{ReferenceSlot, RelationSlot};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Kind of completed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Set,
    Add,
    Remove,
}

/// Field a hook refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Field {
    Attribute(Attribute),
    Reference(ReferenceSlot),
    Relation(RelationSlot),
}

/// Subscriber to one or more entities' mutations.
pub trait ChangeListener {
    /// Called before `field` of `entity` changes away from `old`.
    fn on_changing(&self, entity: EntityKey, field: Field, old: &FieldValue);
    /// Called after the mutation completed.
    fn on_changed(&self, entity: EntityKey, field: Field, op: ChangeOp, value: &FieldValue);
}

/// Per-entity hook dispatcher.
#[derive(Default, Clone)]
pub struct ChangeNotifier {
    listeners: Vec<Rc<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` unless it is already subscribed (compared by pointer).
    pub fn subscribe(&mut self, listener: Rc<dyn ChangeListener>) {
        if self
            .listeners
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &listener))
        {
            return;
        }
        self.listeners.push(listener);
    }

    /// Drops every subscription of `listener` (compared by pointer).
    pub fn unsubscribe(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.listeners
            .retain(|existing| !Rc::ptr_eq(existing, listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn changing(&self, entity: EntityKey, field: Field, old: &FieldValue) {
        for listener in &self.listeners {
            listener.on_changing(entity, field, old);
        }
    }

    pub fn changed(&self, entity: EntityKey, field: Field, op: ChangeOp, value: &FieldValue) {
        for listener in &self.listeners {
            listener.on_changed(entity, field, op, value);
        }
    }
}

impl Debug for ChangeNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// One delivered hook, as recorded by `ChangeRecorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "hook")]
pub enum ChangeEvent {
    Changing {
        entity: EntityKey,
        field: Field,
        old: FieldValue,
    },
    Changed {
        entity: EntityKey,
        field: Field,
        op: ChangeOp,
        value: FieldValue,
    },
}

impl ChangeEvent {
    pub fn entity(&self) -> EntityKey {
        match self {
            Self::Changing { entity, .. } | Self::Changed { entity, .. } => *entity,
        }
    }
}

/// Listener recording every hook and the set of dirty entities.
///
/// Shaped after what a persistence collaborator needs for dirty tracking:
/// an entity becomes dirty on `on_changed` and stays dirty until taken.
#[derive(Debug, Default)]
pub struct ChangeRecorder {
    events: RefCell<Vec<ChangeEvent>>,
    dirty: RefCell<BTreeSet<EntityKey>>,
}

impl ChangeRecorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    /// Returns and forgets the recorded events.
    pub fn take_events(&self) -> Vec<ChangeEvent> {
        self.events.take()
    }

    pub fn dirty(&self) -> BTreeSet<EntityKey> {
        self.dirty.borrow().clone()
    }

    /// Returns and clears the dirty set, as a flush would.
    pub fn take_dirty(&self) -> BTreeSet<EntityKey> {
        self.dirty.take()
    }
}

impl ChangeListener for ChangeRecorder {
    fn on_changing(&self, entity: EntityKey, field: Field, old: &FieldValue) {
        self.events.borrow_mut().push(ChangeEvent::Changing {
            entity,
            field,
            old: old.clone(),
        });
    }

    fn on_changed(&self, entity: EntityKey, field: Field, op: ChangeOp, value: &FieldValue) {
        self.events.borrow_mut().push(ChangeEvent::Changed {
            entity,
            field,
            op,
            value: value.clone(),
        });
        self.dirty.borrow_mut().insert(entity);
    }
}
