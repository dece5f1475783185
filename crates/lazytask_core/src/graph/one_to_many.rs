//! One-to-Many rules and the scalar-owner cascade.
//!
//! # Invariants
//! - `item` is in `owner.container` exactly when `item.reference` is
//!   `owner`, whichever entry point (container or reference) was used.
//! - The cascade touches counterpart containers through raw primitives only,
//!   so it never re-enters `add` / `discard`.

use crate::error::ModelResult;
use crate::graph::store::EntityStore;
use crate::model::attribute::FieldValue;
use crate::model::ids::EntityKey;
use crate::notify::{ChangeOp, Field};
use crate::relation::association::{OneToMany, ReferenceSlot};
use log::trace;

impl EntityStore {
    /// Points `child`'s scalar reference at `new_owner` (or clears it),
    /// moving `child` between the owners' containers.
    ///
    /// No-op when the reference already has that value.
    ///
    /// # Errors
    /// - `EntityNotFound` for an unknown `child` or `new_owner`.
    /// - `MissingCounterpart` when `child` lacks `slot` or `new_owner` is not
    ///   of the owning kind.
    pub fn set_reference(
        &mut self,
        child: EntityKey,
        slot: ReferenceSlot,
        new_owner: Option<EntityKey>,
    ) -> ModelResult<()> {
        let pair = slot.association();
        let previous = self.reference(child, slot)?;
        if let Some(owner) = new_owner {
            self.ensure_kind(owner, pair.owner_kind, pair.container.name())?;
        }
        if previous == new_owner {
            return Ok(());
        }
        let detach_from = self.live_owner(previous, pair);

        let field = Field::Reference(slot);
        self.notify_changing(child, field, &FieldValue::from_reference(previous));
        if let Some(previous_owner) = detach_from {
            self.relation(previous_owner, pair.container)?
                .raw_discard(child);
        }
        *self.reference_mut(child, slot)? = new_owner;
        if let Some(owner) = new_owner {
            self.relation(owner, pair.container)?.raw_add(child);
        }
        self.notify_changed(
            child,
            field,
            ChangeOp::Set,
            &FieldValue::from_reference(new_owner),
        );
        trace!(
            "event=reference_set module=graph status=ok child={} slot={} owner={:?}",
            child,
            slot.name(),
            new_owner
        );
        Ok(())
    }

    /// `owner` when it is a live entity of the owning kind.
    ///
    /// A bootstrap reference may name a key that was not live when the
    /// child was restored and was later allocated to another kind; such a
    /// stale owner has no container to detach from.
    fn live_owner(&self, owner: Option<EntityKey>, pair: OneToMany) -> Option<EntityKey> {
        owner.filter(|key| self.kind(*key).ok() == Some(pair.owner_kind))
    }

    pub(crate) fn one_to_many_add(
        &mut self,
        owner: EntityKey,
        pair: OneToMany,
        item: EntityKey,
    ) -> ModelResult<()> {
        self.ensure_kind(owner, pair.owner_kind, pair.container.name())?;
        self.ensure_kind(item, pair.member_kind, pair.reference.name())?;
        if self.relation(owner, pair.container)?.contains(item) {
            return Ok(());
        }

        let field = Field::Relation(pair.container);
        self.notify_changing(owner, field, &FieldValue::Unset);
        self.relation(owner, pair.container)?.raw_add(item);
        self.set_reference(item, pair.reference, Some(owner))?;
        self.notify_changed(owner, field, ChangeOp::Add, &FieldValue::Entity(item));
        trace!(
            "event=relation_add module=graph status=ok owner={} slot={} item={}",
            owner,
            pair.container.name(),
            item
        );
        Ok(())
    }

    pub(crate) fn one_to_many_discard(
        &mut self,
        owner: EntityKey,
        pair: OneToMany,
        item: EntityKey,
    ) -> ModelResult<()> {
        self.ensure_kind(owner, pair.owner_kind, pair.container.name())?;
        if !self.relation(owner, pair.container)?.contains(item) {
            return Ok(());
        }

        let field = Field::Relation(pair.container);
        self.notify_changing(owner, field, &FieldValue::Unset);
        self.relation(owner, pair.container)?.raw_discard(item);
        if self.contains_entity(item) && self.reference(item, pair.reference)? == Some(owner) {
            self.set_reference(item, pair.reference, None)?;
        }
        self.notify_changed(owner, field, ChangeOp::Remove, &FieldValue::Entity(item));
        trace!(
            "event=relation_discard module=graph status=ok owner={} slot={} item={}",
            owner,
            pair.container.name(),
            item
        );
        Ok(())
    }
}
