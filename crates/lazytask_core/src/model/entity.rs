//! Domain entities composed from relation containers and references.
//!
//! # Responsibility
//! - Define task/tag/note/attachment/user records as typed fields.
//! - Expose relation fields through the narrow `HasRelations` capability.
//!
//! # Invariants
//! - Each container is owned by the entity holding it (`owner()` is that
//!   entity's key) and is never shared with another entity.
//! - Fields are mutated only through `EntityStore`, which keeps both sides
//!   of every pair consistent and fires change hooks.

use crate::error::ModelResult;
use crate::model::attribute::{Attribute, FieldValue, TaskStatus};
use crate::model::ids::{EntityKey, EntityKind};
use crate::notify::ChangeNotifier;
use crate::relation::association::{ReferenceSlot, RelationSlot};
use crate::relation::lazy::LazyRelation;

/// Access to an entity's relation containers and scalar references.
///
/// Slots the entity does not declare resolve to `None`; the store turns
/// that into `ModelError::MissingCounterpart`.
pub trait HasRelations {
    fn relation(&self, slot: RelationSlot) -> Option<&LazyRelation>;
    fn relation_mut(&mut self, slot: RelationSlot) -> Option<&mut LazyRelation>;
    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>>;
    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>>;
}

#[derive(Debug)]
pub struct Task {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) owner: Option<EntityKey>,
    pub(crate) notes: LazyRelation,
    pub(crate) attachments: LazyRelation,
    pub(crate) tags: LazyRelation,
    pub(crate) dependees: LazyRelation,
    pub(crate) dependants: LazyRelation,
    pub(crate) prioritized_over: LazyRelation,
    pub(crate) prioritized_under: LazyRelation,
}

impl Task {
    pub(crate) fn new(key: EntityKey, title: String) -> ModelResult<Self> {
        Ok(Self {
            title,
            description: None,
            status: TaskStatus::Todo,
            owner: None,
            notes: LazyRelation::empty(key)?,
            attachments: LazyRelation::empty(key)?,
            tags: LazyRelation::empty(key)?,
            dependees: LazyRelation::empty(key)?,
            dependants: LazyRelation::empty(key)?,
            prioritized_over: LazyRelation::empty(key)?,
            prioritized_under: LazyRelation::empty(key)?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn owner(&self) -> Option<EntityKey> {
        self.owner
    }
}

impl HasRelations for Task {
    fn relation(&self, slot: RelationSlot) -> Option<&LazyRelation> {
        match slot {
            RelationSlot::TaskNotes => Some(&self.notes),
            RelationSlot::TaskAttachments => Some(&self.attachments),
            RelationSlot::TaskTags => Some(&self.tags),
            RelationSlot::TaskDependees => Some(&self.dependees),
            RelationSlot::TaskDependants => Some(&self.dependants),
            RelationSlot::TaskPrioritizedOver => Some(&self.prioritized_over),
            RelationSlot::TaskPrioritizedUnder => Some(&self.prioritized_under),
            _ => None,
        }
    }

    fn relation_mut(&mut self, slot: RelationSlot) -> Option<&mut LazyRelation> {
        match slot {
            RelationSlot::TaskNotes => Some(&mut self.notes),
            RelationSlot::TaskAttachments => Some(&mut self.attachments),
            RelationSlot::TaskTags => Some(&mut self.tags),
            RelationSlot::TaskDependees => Some(&mut self.dependees),
            RelationSlot::TaskDependants => Some(&mut self.dependants),
            RelationSlot::TaskPrioritizedOver => Some(&mut self.prioritized_over),
            RelationSlot::TaskPrioritizedUnder => Some(&mut self.prioritized_under),
            _ => None,
        }
    }

    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        (slot == ReferenceSlot::TaskOwner).then_some(self.owner)
    }

    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        (slot == ReferenceSlot::TaskOwner).then_some(&mut self.owner)
    }
}

#[derive(Debug)]
pub struct Tag {
    pub(crate) name: String,
    pub(crate) owner: Option<EntityKey>,
    pub(crate) tasks: LazyRelation,
}

impl Tag {
    pub(crate) fn new(key: EntityKey, name: String) -> ModelResult<Self> {
        Ok(Self {
            name,
            owner: None,
            tasks: LazyRelation::empty(key)?,
        })
    }

    /// Normalized (trimmed, lowercase) tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<EntityKey> {
        self.owner
    }
}

impl HasRelations for Tag {
    fn relation(&self, slot: RelationSlot) -> Option<&LazyRelation> {
        (slot == RelationSlot::TagTasks).then_some(&self.tasks)
    }

    fn relation_mut(&mut self, slot: RelationSlot) -> Option<&mut LazyRelation> {
        (slot == RelationSlot::TagTasks).then_some(&mut self.tasks)
    }

    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        (slot == ReferenceSlot::TagOwner).then_some(self.owner)
    }

    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        (slot == ReferenceSlot::TagOwner).then_some(&mut self.owner)
    }
}

#[derive(Debug)]
pub struct Note {
    pub(crate) content: String,
    pub(crate) task: Option<EntityKey>,
}

impl Note {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn task(&self) -> Option<EntityKey> {
        self.task
    }
}

impl HasRelations for Note {
    fn relation(&self, _slot: RelationSlot) -> Option<&LazyRelation> {
        None
    }

    fn relation_mut(&mut self, _slot: RelationSlot) -> Option<&mut LazyRelation> {
        None
    }

    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        (slot == ReferenceSlot::NoteTask).then_some(self.task)
    }

    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        (slot == ReferenceSlot::NoteTask).then_some(&mut self.task)
    }
}

#[derive(Debug)]
pub struct Attachment {
    pub(crate) filename: String,
    pub(crate) task: Option<EntityKey>,
}

impl Attachment {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn task(&self) -> Option<EntityKey> {
        self.task
    }
}

impl HasRelations for Attachment {
    fn relation(&self, _slot: RelationSlot) -> Option<&LazyRelation> {
        None
    }

    fn relation_mut(&mut self, _slot: RelationSlot) -> Option<&mut LazyRelation> {
        None
    }

    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        (slot == ReferenceSlot::AttachmentTask).then_some(self.task)
    }

    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        (slot == ReferenceSlot::AttachmentTask).then_some(&mut self.task)
    }
}

#[derive(Debug)]
pub struct User {
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) tasks: LazyRelation,
    pub(crate) tags: LazyRelation,
}

impl User {
    pub(crate) fn new(key: EntityKey, name: String) -> ModelResult<Self> {
        Ok(Self {
            name,
            email: None,
            tasks: LazyRelation::empty(key)?,
            tags: LazyRelation::empty(key)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl HasRelations for User {
    fn relation(&self, slot: RelationSlot) -> Option<&LazyRelation> {
        match slot {
            RelationSlot::UserTasks => Some(&self.tasks),
            RelationSlot::UserTags => Some(&self.tags),
            _ => None,
        }
    }

    fn relation_mut(&mut self, slot: RelationSlot) -> Option<&mut LazyRelation> {
        match slot {
            RelationSlot::UserTasks => Some(&mut self.tasks),
            RelationSlot::UserTags => Some(&mut self.tags),
            _ => None,
        }
    }

    fn reference(&self, _slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        None
    }

    fn reference_mut(&mut self, _slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        None
    }
}

/// Kind-specific payload of an entity.
#[derive(Debug)]
pub enum EntityData {
    Task(Task),
    Tag(Tag),
    Note(Note),
    Attachment(Attachment),
    User(User),
}

impl EntityData {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Task(_) => EntityKind::Task,
            Self::Tag(_) => EntityKind::Tag,
            Self::Note(_) => EntityKind::Note,
            Self::Attachment(_) => EntityKind::Attachment,
            Self::User(_) => EntityKind::User,
        }
    }

    fn relations(&self) -> &dyn HasRelations {
        match self {
            Self::Task(task) => task,
            Self::Tag(tag) => tag,
            Self::Note(note) => note,
            Self::Attachment(attachment) => attachment,
            Self::User(user) => user,
        }
    }

    fn relations_mut(&mut self) -> &mut dyn HasRelations {
        match self {
            Self::Task(task) => task,
            Self::Tag(tag) => tag,
            Self::Note(note) => note,
            Self::Attachment(attachment) => attachment,
            Self::User(user) => user,
        }
    }

    /// Reads a scalar attribute. `None` when the kind lacks it.
    pub fn attribute(&self, attribute: Attribute) -> Option<FieldValue> {
        let value = match (self, attribute) {
            (Self::Task(task), Attribute::Title) => FieldValue::Text(task.title.clone()),
            (Self::Task(task), Attribute::Description) => {
                FieldValue::from_optional_text(task.description.as_deref())
            }
            (Self::Task(task), Attribute::Status) => FieldValue::Status(task.status),
            (Self::Tag(tag), Attribute::Name) => FieldValue::Text(tag.name.clone()),
            (Self::Note(note), Attribute::Content) => FieldValue::Text(note.content.clone()),
            (Self::Attachment(attachment), Attribute::Filename) => {
                FieldValue::Text(attachment.filename.clone())
            }
            (Self::User(user), Attribute::Name) => FieldValue::Text(user.name.clone()),
            (Self::User(user), Attribute::Email) => {
                FieldValue::from_optional_text(user.email.as_deref())
            }
            _ => return None,
        };
        Some(value)
    }

    /// Writes a scalar attribute. Returns `false` when the kind lacks the
    /// attribute or the value has the wrong shape; nothing is written then.
    pub(crate) fn write_attribute(&mut self, attribute: Attribute, value: FieldValue) -> bool {
        match (self, attribute, value) {
            (Self::Task(task), Attribute::Title, FieldValue::Text(text)) => task.title = text,
            (Self::Task(task), Attribute::Description, FieldValue::Text(text)) => {
                task.description = Some(text)
            }
            (Self::Task(task), Attribute::Description, FieldValue::Unset) => {
                task.description = None
            }
            (Self::Task(task), Attribute::Status, FieldValue::Status(status)) => {
                task.status = status
            }
            (Self::Tag(tag), Attribute::Name, FieldValue::Text(text)) => tag.name = text,
            (Self::Note(note), Attribute::Content, FieldValue::Text(text)) => note.content = text,
            (Self::Attachment(attachment), Attribute::Filename, FieldValue::Text(text)) => {
                attachment.filename = text
            }
            (Self::User(user), Attribute::Name, FieldValue::Text(text)) => user.name = text,
            (Self::User(user), Attribute::Email, FieldValue::Text(text)) => {
                user.email = Some(text)
            }
            (Self::User(user), Attribute::Email, FieldValue::Unset) => user.email = None,
            _ => return false,
        }
        true
    }
}

impl HasRelations for EntityData {
    fn relation(&self, slot: RelationSlot) -> Option<&LazyRelation> {
        self.relations().relation(slot)
    }

    fn relation_mut(&mut self, slot: RelationSlot) -> Option<&mut LazyRelation> {
        self.relations_mut().relation_mut(slot)
    }

    fn reference(&self, slot: ReferenceSlot) -> Option<Option<EntityKey>> {
        self.relations().reference(slot)
    }

    fn reference_mut(&mut self, slot: ReferenceSlot) -> Option<&mut Option<EntityKey>> {
        self.relations_mut().reference_mut(slot)
    }
}

/// Arena entry: identity, change notifier and kind-specific data.
#[derive(Debug)]
pub struct Entity {
    pub(crate) key: EntityKey,
    pub(crate) persistent_id: Option<i64>,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) data: EntityData,
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    /// Integer identity assigned by storage; `None` until persisted.
    pub fn persistent_id(&self) -> Option<i64> {
        self.persistent_id
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn as_task(&self) -> Option<&Task> {
        match &self.data {
            EntityData::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match &self.data {
            EntityData::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match &self.data {
            EntityData::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Attachment> {
        match &self.data {
            EntityData::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match &self.data {
            EntityData::User(user) => Some(user),
            _ => None,
        }
    }
}
