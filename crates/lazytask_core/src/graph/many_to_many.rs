//! Many-to-Many rules.
//!
//! The initiating side is updated and notified; the counterpart side is
//! mirrored through `raw_add` / `raw_discard` and fires no hooks, so both
//! sides converge without recursing into each other.

use crate::error::ModelResult;
use crate::graph::store::EntityStore;
use crate::model::attribute::FieldValue;
use crate::model::ids::EntityKey;
use crate::notify::{ChangeOp, Field};
use crate::relation::association::ManyToMany;
use log::trace;

impl EntityStore {
    pub(crate) fn many_to_many_add(
        &mut self,
        owner: EntityKey,
        pair: ManyToMany,
        item: EntityKey,
    ) -> ModelResult<()> {
        self.ensure_kind(owner, pair.owner_kind, pair.relation.name())?;
        self.ensure_kind(item, pair.member_kind, pair.counterpart.name())?;
        if self.relation(owner, pair.relation)?.contains(item) {
            return Ok(());
        }

        let field = Field::Relation(pair.relation);
        self.notify_changing(owner, field, &FieldValue::Unset);
        self.relation(owner, pair.relation)?.raw_add(item);
        self.relation(item, pair.counterpart)?.raw_add(owner);
        self.notify_changed(owner, field, ChangeOp::Add, &FieldValue::Entity(item));
        trace!(
            "event=relation_add module=graph status=ok owner={} slot={} item={}",
            owner,
            pair.relation.name(),
            item
        );
        Ok(())
    }

    pub(crate) fn many_to_many_discard(
        &mut self,
        owner: EntityKey,
        pair: ManyToMany,
        item: EntityKey,
    ) -> ModelResult<()> {
        self.ensure_kind(owner, pair.owner_kind, pair.relation.name())?;
        if !self.relation(owner, pair.relation)?.contains(item) {
            return Ok(());
        }

        let field = Field::Relation(pair.relation);
        self.notify_changing(owner, field, &FieldValue::Unset);
        self.relation(owner, pair.relation)?.raw_discard(item);
        if self.contains_entity(item) {
            self.relation(item, pair.counterpart)?.raw_discard(owner);
        }
        self.notify_changed(owner, field, ChangeOp::Remove, &FieldValue::Entity(item));
        trace!(
            "event=relation_discard module=graph status=ok owner={} slot={} item={}",
            owner,
            pair.relation.name(),
            item
        );
        Ok(())
    }
}
