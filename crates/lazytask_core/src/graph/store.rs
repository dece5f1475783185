//! Arena of entities addressed by `EntityKey`.
//!
//! # Responsibility
//! - Own every entity and allocate stable keys.
//! - Dispatch relation operations to the One-to-Many / Many-to-Many rules.
//! - Assign attributes and persistent ids under the notification protocol.
//! - Sever every relation of an entity before it is dropped.
//!
//! # Invariants
//! - Keys are allocated monotonically and never reused.
//! - Validation happens before the first hook fires; a failing call leaves
//!   the graph and listeners untouched.
//! - After `teardown`, no other entity refers to the torn-down entity.

use crate::error::{ModelError, ModelResult};
use crate::graph::draft::EntityDraft;
use crate::model::attribute::{normalize_tag_name, Attribute, FieldValue, TaskStatus};
use crate::model::entity::{Entity, HasRelations};
use crate::model::ids::{EntityKey, EntityKind};
use crate::notify::{ChangeListener, ChangeNotifier, ChangeOp, Field};
use crate::relation::association::{Association, ReferenceSlot, RelationSlot};
use crate::relation::lazy::LazyRelation;
use log::{debug, trace};
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory owner of all entities and their relations.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<EntityKey, Entity>,
    persistent_index: HashMap<(EntityKind, i64), EntityKey>,
    listeners: ChangeNotifier,
    last_key: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains_entity(&self, key: EntityKey) -> bool {
        self.entities.contains_key(&key)
    }

    /// Keys of all live entities, sorted.
    pub fn keys(&self) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> = self.entities.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(&key)
    }

    pub(crate) fn entity(&self, key: EntityKey) -> ModelResult<&Entity> {
        self.entities
            .get(&key)
            .ok_or(ModelError::EntityNotFound(key))
    }

    fn entity_mut(&mut self, key: EntityKey) -> ModelResult<&mut Entity> {
        self.entities
            .get_mut(&key)
            .ok_or(ModelError::EntityNotFound(key))
    }

    pub fn kind(&self, key: EntityKey) -> ModelResult<EntityKind> {
        Ok(self.entity(key)?.kind())
    }

    /// Inserts a new or reconstructed entity and returns its key.
    ///
    /// # Errors
    /// - Any error of `EntityDraft::build`.
    /// - `InvalidArgument` when the draft's persistent id is already used
    ///   by another entity of the same kind.
    /// - `MissingCounterpart` when a draft reference targets a live entity
    ///   that is not of the reference's owning kind.
    /// - `InvalidArgument` when a draft reference targets the key being
    ///   allocated.
    ///
    /// A reference whose target is live and already loaded is mirrored into
    /// the target's container; a deferred target is left to its loader.
    pub fn restore(&mut self, draft: EntityDraft) -> ModelResult<EntityKey> {
        let kind = draft.kind();
        let persistent_id = draft.persistent_id();
        if let Some(id) = persistent_id {
            if self.persistent_index.contains_key(&(kind, id)) {
                return Err(ModelError::InvalidArgument(
                    "persistent id already in use",
                ));
            }
        }
        let key = EntityKey::from_raw(self.last_key + 1);
        let references = draft.references().to_vec();
        for &(slot, target) in &references {
            if target == key {
                return Err(ModelError::InvalidArgument(
                    "reference must not target the restored entity",
                ));
            }
            if self.contains_entity(target) {
                let pair = slot.association();
                self.ensure_kind(target, pair.owner_kind, pair.container.name())?;
            }
        }

        let data = draft.build(key)?;
        self.last_key = key.raw();
        if let Some(id) = persistent_id {
            self.persistent_index.insert((kind, id), key);
        }
        self.entities.insert(
            key,
            Entity {
                key,
                persistent_id,
                notifier: self.listeners.clone(),
                data,
            },
        );
        for (slot, target) in references {
            if !self.contains_entity(target) {
                continue;
            }
            let container = self.relation(target, slot.association().container)?;
            if container.is_loaded() {
                container.raw_add(key);
            }
        }
        debug!(
            "event=entity_insert module=graph status=ok key={} kind={} persisted={}",
            key,
            kind,
            persistent_id.is_some()
        );
        Ok(key)
    }

    pub fn create_task(&mut self, title: impl Into<String>) -> ModelResult<EntityKey> {
        self.restore(EntityDraft::task(title))
    }

    pub fn create_tag(&mut self, name: impl Into<String>) -> ModelResult<EntityKey> {
        self.restore(EntityDraft::tag(name))
    }

    pub fn create_note(&mut self, content: impl Into<String>) -> ModelResult<EntityKey> {
        self.restore(EntityDraft::note(content))
    }

    pub fn create_attachment(&mut self, filename: impl Into<String>) -> ModelResult<EntityKey> {
        self.restore(EntityDraft::attachment(filename))
    }

    pub fn create_user(&mut self, name: impl Into<String>) -> ModelResult<EntityKey> {
        self.restore(EntityDraft::user(name))
    }

    /// Subscribes `listener` to one entity's hooks.
    pub fn subscribe(
        &mut self,
        key: EntityKey,
        listener: Rc<dyn ChangeListener>,
    ) -> ModelResult<()> {
        self.entity_mut(key)?.notifier.subscribe(listener);
        Ok(())
    }

    /// Subscribes `listener` to every current and future entity.
    pub fn subscribe_all(&mut self, listener: Rc<dyn ChangeListener>) {
        for entity in self.entities.values_mut() {
            entity.notifier.subscribe(listener.clone());
        }
        self.listeners.subscribe(listener);
    }

    /// Records the integer identity assigned by storage.
    ///
    /// Re-assigning the same id is a no-op.
    ///
    /// # Errors
    /// - `InvalidArgument` when the entity already has a different id, or
    ///   the id belongs to another entity of the same kind.
    pub fn assign_persistent_id(&mut self, key: EntityKey, id: i64) -> ModelResult<()> {
        let entity = self.entity(key)?;
        let kind = entity.kind();
        match entity.persistent_id {
            Some(existing) if existing == id => return Ok(()),
            Some(_) => {
                return Err(ModelError::InvalidArgument(
                    "entity already has a persistent id",
                ))
            }
            None => {}
        }
        if self.persistent_index.contains_key(&(kind, id)) {
            return Err(ModelError::InvalidArgument("persistent id already in use"));
        }

        self.entity_mut(key)?.persistent_id = Some(id);
        self.persistent_index.insert((kind, id), key);
        Ok(())
    }

    pub fn find_by_persistent_id(&self, kind: EntityKind, id: i64) -> Option<EntityKey> {
        self.persistent_index.get(&(kind, id)).copied()
    }

    pub fn attribute(&self, key: EntityKey, attribute: Attribute) -> ModelResult<FieldValue> {
        let entity = self.entity(key)?;
        entity
            .data
            .attribute(attribute)
            .ok_or(ModelError::Attribute {
                attribute,
                kind: entity.kind(),
            })
    }

    /// Assigns a scalar attribute, firing hooks unless the value is equal.
    ///
    /// Tag names are normalized before comparison.
    ///
    /// # Errors
    /// - `Attribute` when the kind lacks `attribute` or `value` has the
    ///   wrong shape.
    /// - `InvalidArgument` for a blank tag name.
    pub fn set_attribute(
        &mut self,
        key: EntityKey,
        attribute: Attribute,
        value: FieldValue,
    ) -> ModelResult<()> {
        let kind = self.kind(key)?;
        let current = self.attribute(key, attribute)?;
        if !value_fits(attribute, &value) {
            return Err(ModelError::Attribute { attribute, kind });
        }
        let value = match (kind, attribute, value) {
            (EntityKind::Tag, Attribute::Name, FieldValue::Text(name)) => FieldValue::Text(
                normalize_tag_name(&name)
                    .ok_or(ModelError::InvalidArgument("tag name must not be blank"))?,
            ),
            (_, _, other) => other,
        };
        if current == value {
            return Ok(());
        }

        let field = Field::Attribute(attribute);
        self.notify_changing(key, field, &current);
        let entity = self.entity_mut(key)?;
        if !entity.data.write_attribute(attribute, value.clone()) {
            return Err(ModelError::Attribute { attribute, kind });
        }
        self.notify_changed(key, field, ChangeOp::Set, &value);
        trace!(
            "event=attribute_set module=graph status=ok key={} attribute={}",
            key,
            attribute.name()
        );
        Ok(())
    }

    pub fn set_task_status(&mut self, key: EntityKey, status: TaskStatus) -> ModelResult<()> {
        self.set_attribute(key, Attribute::Status, FieldValue::Status(status))
    }

    /// Mutable access to one relation container.
    ///
    /// Observing calls on the container populate it; `raw_add` /
    /// `raw_discard` bypass the counterpart and are meant for bootstrap code.
    ///
    /// # Errors
    /// - `EntityNotFound`, or `MissingCounterpart` when the owner's kind
    ///   does not declare `slot`.
    pub fn relation(
        &mut self,
        owner: EntityKey,
        slot: RelationSlot,
    ) -> ModelResult<&mut LazyRelation> {
        let entity = self.entity_mut(owner)?;
        let kind = entity.kind();
        entity
            .data
            .relation_mut(slot)
            .ok_or(ModelError::MissingCounterpart {
                slot: slot.name(),
                kind,
            })
    }

    /// Sorted member keys of one relation container.
    pub fn members(&mut self, owner: EntityKey, slot: RelationSlot) -> ModelResult<Vec<EntityKey>> {
        Ok(self.relation(owner, slot)?.members())
    }

    pub fn contains(
        &mut self,
        owner: EntityKey,
        slot: RelationSlot,
        item: EntityKey,
    ) -> ModelResult<bool> {
        Ok(self.relation(owner, slot)?.contains(item))
    }

    /// Current target of a scalar reference.
    pub fn reference(&self, key: EntityKey, slot: ReferenceSlot) -> ModelResult<Option<EntityKey>> {
        let entity = self.entity(key)?;
        entity
            .data
            .reference(slot)
            .ok_or(ModelError::MissingCounterpart {
                slot: slot.name(),
                kind: entity.kind(),
            })
    }

    pub(crate) fn reference_mut(
        &mut self,
        key: EntityKey,
        slot: ReferenceSlot,
    ) -> ModelResult<&mut Option<EntityKey>> {
        let entity = self.entity_mut(key)?;
        let kind = entity.kind();
        entity
            .data
            .reference_mut(slot)
            .ok_or(ModelError::MissingCounterpart {
                slot: slot.name(),
                kind,
            })
    }

    /// Fails with `MissingCounterpart` unless `key` is of `expected` kind.
    pub(crate) fn ensure_kind(
        &self,
        key: EntityKey,
        expected: EntityKind,
        field: &'static str,
    ) -> ModelResult<()> {
        let kind = self.kind(key)?;
        if kind != expected {
            return Err(ModelError::MissingCounterpart { slot: field, kind });
        }
        Ok(())
    }

    pub(crate) fn notify_changing(&self, key: EntityKey, field: Field, old: &FieldValue) {
        if let Some(entity) = self.entities.get(&key) {
            entity.notifier.changing(key, field, old);
        }
    }

    pub(crate) fn notify_changed(
        &self,
        key: EntityKey,
        field: Field,
        op: ChangeOp,
        value: &FieldValue,
    ) {
        if let Some(entity) = self.entities.get(&key) {
            entity.notifier.changed(key, field, op, value);
        }
    }

    /// Adds `item` to `owner`'s `slot`, keeping the counterpart in sync.
    ///
    /// No-op when `item` is already a member.
    pub fn add(&mut self, owner: EntityKey, slot: RelationSlot, item: EntityKey) -> ModelResult<()> {
        match slot.association() {
            Association::OneToMany(pair) => self.one_to_many_add(owner, pair, item),
            Association::ManyToMany(pair) => self.many_to_many_add(owner, pair, item),
        }
    }

    /// Alias of `add`.
    pub fn append(
        &mut self,
        owner: EntityKey,
        slot: RelationSlot,
        item: EntityKey,
    ) -> ModelResult<()> {
        self.add(owner, slot, item)
    }

    /// Removes `item` from `owner`'s `slot`; silent when absent.
    pub fn discard(
        &mut self,
        owner: EntityKey,
        slot: RelationSlot,
        item: EntityKey,
    ) -> ModelResult<()> {
        match slot.association() {
            Association::OneToMany(pair) => self.one_to_many_discard(owner, pair, item),
            Association::ManyToMany(pair) => self.many_to_many_discard(owner, pair, item),
        }
    }

    /// Removes `item` from `owner`'s `slot`.
    ///
    /// # Errors
    /// - `NotFound` when `item` is not a member.
    pub fn remove(
        &mut self,
        owner: EntityKey,
        slot: RelationSlot,
        item: EntityKey,
    ) -> ModelResult<()> {
        if !self.contains(owner, slot, item)? {
            return Err(ModelError::NotFound { slot, item });
        }
        self.discard(owner, slot, item)
    }

    /// Severs every relation `key` takes part in.
    ///
    /// Scalar references are cleared through the cascade and every owned
    /// container is emptied through `discard`, so counterparts on other
    /// entities are updated and the usual hooks fire.
    pub fn teardown(&mut self, key: EntityKey) -> ModelResult<()> {
        let kind = self.kind(key)?;
        for slot in ReferenceSlot::ALL {
            if let Some(Some(_)) = self.entity(key)?.data.reference(slot) {
                self.set_reference(key, slot, None)?;
            }
        }
        let mut severed = 0usize;
        for slot in RelationSlot::ALL {
            if slot.owner_kind() != kind {
                continue;
            }
            for item in self.members(key, slot)? {
                self.discard(key, slot, item)?;
                severed += 1;
            }
        }
        debug!(
            "event=entity_teardown module=graph status=ok key={} kind={} severed={}",
            key, kind, severed
        );
        Ok(())
    }

    /// Tears down `key` and drops it from the arena.
    pub fn delete(&mut self, key: EntityKey) -> ModelResult<Entity> {
        self.teardown(key)?;
        let entity = self
            .entities
            .remove(&key)
            .ok_or(ModelError::EntityNotFound(key))?;
        if let Some(id) = entity.persistent_id {
            self.persistent_index.remove(&(entity.kind(), id));
        }
        Ok(entity)
    }
}

fn value_fits(attribute: Attribute, value: &FieldValue) -> bool {
    match attribute {
        Attribute::Title | Attribute::Name | Attribute::Content | Attribute::Filename => {
            matches!(value, FieldValue::Text(_))
        }
        Attribute::Description | Attribute::Email => {
            matches!(value, FieldValue::Text(_) | FieldValue::Unset)
        }
        Attribute::Status => matches!(value, FieldValue::Status(_)),
    }
}
