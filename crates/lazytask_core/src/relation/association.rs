//! Statically declared bidirectional associations.
//!
//! # Responsibility
//! - Name every relation container and scalar reference field.
//! - Pair each endpoint with its counterpart at definition time.
//!
//! # Invariants
//! - Every `RelationSlot` resolves to exactly one `Association`.
//! - A Many-to-Many slot's counterpart's counterpart is the slot itself.
//! - A One-to-Many slot and its `ReferenceSlot` resolve to the same pair.

use crate::model::ids::EntityKind;
use serde::{Deserialize, Serialize};

/// Relation container fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationSlot {
    UserTasks,
    UserTags,
    TaskNotes,
    TaskAttachments,
    TaskTags,
    TagTasks,
    TaskDependees,
    TaskDependants,
    TaskPrioritizedOver,
    TaskPrioritizedUnder,
}

/// Scalar reference fields (the "child" side of One-to-Many pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSlot {
    TaskOwner,
    TagOwner,
    NoteTask,
    AttachmentTask,
}

/// One-to-Many pair: a container on the owner, a reference on each member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneToMany {
    pub container: RelationSlot,
    pub reference: ReferenceSlot,
    pub owner_kind: EntityKind,
    pub member_kind: EntityKind,
}

/// Many-to-Many pair seen from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManyToMany {
    pub relation: RelationSlot,
    pub counterpart: RelationSlot,
    pub owner_kind: EntityKind,
    pub member_kind: EntityKind,
}

/// Resolved descriptor of a relation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    OneToMany(OneToMany),
    ManyToMany(ManyToMany),
}

pub const USER_TASKS: OneToMany = OneToMany {
    container: RelationSlot::UserTasks,
    reference: ReferenceSlot::TaskOwner,
    owner_kind: EntityKind::User,
    member_kind: EntityKind::Task,
};

pub const USER_TAGS: OneToMany = OneToMany {
    container: RelationSlot::UserTags,
    reference: ReferenceSlot::TagOwner,
    owner_kind: EntityKind::User,
    member_kind: EntityKind::Tag,
};

pub const TASK_NOTES: OneToMany = OneToMany {
    container: RelationSlot::TaskNotes,
    reference: ReferenceSlot::NoteTask,
    owner_kind: EntityKind::Task,
    member_kind: EntityKind::Note,
};

pub const TASK_ATTACHMENTS: OneToMany = OneToMany {
    container: RelationSlot::TaskAttachments,
    reference: ReferenceSlot::AttachmentTask,
    owner_kind: EntityKind::Task,
    member_kind: EntityKind::Attachment,
};

pub const TASK_TAGS: ManyToMany = ManyToMany {
    relation: RelationSlot::TaskTags,
    counterpart: RelationSlot::TagTasks,
    owner_kind: EntityKind::Task,
    member_kind: EntityKind::Tag,
};

pub const TAG_TASKS: ManyToMany = TASK_TAGS.mirrored();

pub const TASK_DEPENDEES: ManyToMany = ManyToMany {
    relation: RelationSlot::TaskDependees,
    counterpart: RelationSlot::TaskDependants,
    owner_kind: EntityKind::Task,
    member_kind: EntityKind::Task,
};

pub const TASK_DEPENDANTS: ManyToMany = TASK_DEPENDEES.mirrored();

pub const TASK_PRIORITIZED_OVER: ManyToMany = ManyToMany {
    relation: RelationSlot::TaskPrioritizedOver,
    counterpart: RelationSlot::TaskPrioritizedUnder,
    owner_kind: EntityKind::Task,
    member_kind: EntityKind::Task,
};

pub const TASK_PRIORITIZED_UNDER: ManyToMany = TASK_PRIORITIZED_OVER.mirrored();

impl ManyToMany {
    /// Same pair seen from the counterpart side.
    pub const fn mirrored(self) -> Self {
        Self {
            relation: self.counterpart,
            counterpart: self.relation,
            owner_kind: self.member_kind,
            member_kind: self.owner_kind,
        }
    }
}

impl RelationSlot {
    /// Every container slot, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::UserTasks,
        Self::UserTags,
        Self::TaskNotes,
        Self::TaskAttachments,
        Self::TaskTags,
        Self::TagTasks,
        Self::TaskDependees,
        Self::TaskDependants,
        Self::TaskPrioritizedOver,
        Self::TaskPrioritizedUnder,
    ];

    /// Resolves the descriptor this container participates in.
    pub const fn association(self) -> Association {
        match self {
            Self::UserTasks => Association::OneToMany(USER_TASKS),
            Self::UserTags => Association::OneToMany(USER_TAGS),
            Self::TaskNotes => Association::OneToMany(TASK_NOTES),
            Self::TaskAttachments => Association::OneToMany(TASK_ATTACHMENTS),
            Self::TaskTags => Association::ManyToMany(TASK_TAGS),
            Self::TagTasks => Association::ManyToMany(TAG_TASKS),
            Self::TaskDependees => Association::ManyToMany(TASK_DEPENDEES),
            Self::TaskDependants => Association::ManyToMany(TASK_DEPENDANTS),
            Self::TaskPrioritizedOver => Association::ManyToMany(TASK_PRIORITIZED_OVER),
            Self::TaskPrioritizedUnder => Association::ManyToMany(TASK_PRIORITIZED_UNDER),
        }
    }

    /// Kind of the entity holding this container.
    pub const fn owner_kind(self) -> EntityKind {
        match self.association() {
            Association::OneToMany(pair) => pair.owner_kind,
            Association::ManyToMany(pair) => pair.owner_kind,
        }
    }

    /// Kind of the entities this container holds.
    pub const fn member_kind(self) -> EntityKind {
        match self.association() {
            Association::OneToMany(pair) => pair.member_kind,
            Association::ManyToMany(pair) => pair.member_kind,
        }
    }

    /// Field name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::UserTasks => "user.tasks",
            Self::UserTags => "user.tags",
            Self::TaskNotes => "task.notes",
            Self::TaskAttachments => "task.attachments",
            Self::TaskTags => "task.tags",
            Self::TagTasks => "tag.tasks",
            Self::TaskDependees => "task.dependees",
            Self::TaskDependants => "task.dependants",
            Self::TaskPrioritizedOver => "task.prioritized_over",
            Self::TaskPrioritizedUnder => "task.prioritized_under",
        }
    }
}

impl ReferenceSlot {
    /// Every scalar reference slot, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::TaskOwner,
        Self::TagOwner,
        Self::NoteTask,
        Self::AttachmentTask,
    ];

    /// Resolves the One-to-Many pair this reference is the inverse of.
    pub const fn association(self) -> OneToMany {
        match self {
            Self::TaskOwner => USER_TASKS,
            Self::TagOwner => USER_TAGS,
            Self::NoteTask => TASK_NOTES,
            Self::AttachmentTask => TASK_ATTACHMENTS,
        }
    }

    /// Field name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::TaskOwner => "task.owner",
            Self::TagOwner => "tag.owner",
            Self::NoteTask => "note.task",
            Self::AttachmentTask => "attachment.task",
        }
    }
}
