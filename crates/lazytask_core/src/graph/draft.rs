//! Entity drafts: the single construction path into `EntityStore`.
//!
//! A draft carries the attributes of a new or reconstructed entity plus the
//! bootstrap data a persistence collaborator may already hold: a persistent
//! id, raw scalar references, and deferred sources per relation container.

use crate::error::{ModelError, ModelResult};
use crate::model::attribute::normalize_tag_name;
use crate::model::entity::{Attachment, EntityData, HasRelations, Note, Tag, Task, User};
use crate::model::ids::{EntityKey, EntityKind};
use crate::relation::association::{ReferenceSlot, RelationSlot};
use crate::relation::lazy::RelationLoader;

#[derive(Debug, Clone)]
enum DraftPayload {
    Task { title: String },
    Tag { name: String },
    Note { content: String },
    Attachment { filename: String },
    User { name: String },
}

/// Unbuilt entity handed to `EntityStore::restore`.
pub struct EntityDraft {
    payload: DraftPayload,
    persistent_id: Option<i64>,
    references: Vec<(ReferenceSlot, EntityKey)>,
    loaders: Vec<(RelationSlot, Box<dyn RelationLoader>)>,
}

impl EntityDraft {
    fn with_payload(payload: DraftPayload) -> Self {
        Self {
            payload,
            persistent_id: None,
            references: Vec::new(),
            loaders: Vec::new(),
        }
    }

    pub fn task(title: impl Into<String>) -> Self {
        Self::with_payload(DraftPayload::Task {
            title: title.into(),
        })
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::with_payload(DraftPayload::Tag { name: name.into() })
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::with_payload(DraftPayload::Note {
            content: content.into(),
        })
    }

    pub fn attachment(filename: impl Into<String>) -> Self {
        Self::with_payload(DraftPayload::Attachment {
            filename: filename.into(),
        })
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::with_payload(DraftPayload::User { name: name.into() })
    }

    pub fn kind(&self) -> EntityKind {
        match self.payload {
            DraftPayload::Task { .. } => EntityKind::Task,
            DraftPayload::Tag { .. } => EntityKind::Tag,
            DraftPayload::Note { .. } => EntityKind::Note,
            DraftPayload::Attachment { .. } => EntityKind::Attachment,
            DraftPayload::User { .. } => EntityKind::User,
        }
    }

    pub fn with_persistent_id(mut self, id: i64) -> Self {
        self.persistent_id = Some(id);
        self
    }

    /// Sets a scalar reference without cascading into the target's
    /// container. The target's own loader is expected to list this entity.
    pub fn with_reference(mut self, slot: ReferenceSlot, target: EntityKey) -> Self {
        self.references.push((slot, target));
        self
    }

    /// Defers the initial membership of `slot` to `loader`.
    pub fn with_loader(mut self, slot: RelationSlot, loader: Box<dyn RelationLoader>) -> Self {
        self.loaders.push((slot, loader));
        self
    }

    pub(crate) fn persistent_id(&self) -> Option<i64> {
        self.persistent_id
    }

    pub(crate) fn references(&self) -> &[(ReferenceSlot, EntityKey)] {
        &self.references
    }

    /// Builds the entity payload for `key`.
    ///
    /// # Errors
    /// - `InvalidArgument` for a nil key or a blank tag name.
    /// - `MissingCounterpart` when a loader or reference names a slot the
    ///   kind does not declare.
    pub(crate) fn build(self, key: EntityKey) -> ModelResult<EntityData> {
        let kind = self.kind();
        let mut data = match self.payload {
            DraftPayload::Task { title } => EntityData::Task(Task::new(key, title)?),
            DraftPayload::Tag { name } => {
                let normalized = normalize_tag_name(&name)
                    .ok_or(ModelError::InvalidArgument("tag name must not be blank"))?;
                EntityData::Tag(Tag::new(key, normalized)?)
            }
            DraftPayload::Note { content } => EntityData::Note(Note {
                content,
                task: None,
            }),
            DraftPayload::Attachment { filename } => EntityData::Attachment(Attachment {
                filename,
                task: None,
            }),
            DraftPayload::User { name } => EntityData::User(User::new(key, name)?),
        };

        for (slot, target) in self.references {
            let reference = data
                .reference_mut(slot)
                .ok_or(ModelError::MissingCounterpart {
                    slot: slot.name(),
                    kind,
                })?;
            *reference = Some(target);
        }
        for (slot, loader) in self.loaders {
            data.relation_mut(slot)
                .ok_or(ModelError::MissingCounterpart {
                    slot: slot.name(),
                    kind,
                })?
                .defer_to(loader);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::EntityDraft;
    use crate::error::ModelError;
    use crate::model::entity::HasRelations;
    use crate::model::ids::{EntityKey, EntityKind};
    use crate::relation::association::{ReferenceSlot, RelationSlot};
    use crate::relation::lazy::PreloadedMembers;

    #[test]
    fn loader_on_foreign_slot_is_rejected() {
        let draft = EntityDraft::note("body")
            .with_loader(RelationSlot::TaskTags, Box::new(PreloadedMembers::default()));
        let err = draft.build(EntityKey::from_raw(1)).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingCounterpart {
                slot: "task.tags",
                kind: EntityKind::Note,
            }
        );
    }

    #[test]
    fn references_are_assigned_raw() {
        let owner = EntityKey::from_raw(5);
        let data = EntityDraft::note("body")
            .with_reference(ReferenceSlot::NoteTask, owner)
            .build(EntityKey::from_raw(6))
            .unwrap();
        assert_eq!(data.reference(ReferenceSlot::NoteTask), Some(Some(owner)));
    }

    #[test]
    fn blank_tag_name_is_rejected() {
        let err = EntityDraft::tag("  ").build(EntityKey::from_raw(1)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
    }
}
