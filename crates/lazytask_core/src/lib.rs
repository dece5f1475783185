//! Core domain objects for LazyTask.
//! This crate keeps entity relations mutually consistent in memory.

pub mod error;
pub mod graph;
pub mod logging;
pub mod model;
pub mod notify;
pub mod relation;

pub use error::{ModelError, ModelResult};
pub use graph::cycle::DirectedEdges;
pub use graph::draft::EntityDraft;
pub use graph::store::EntityStore;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attribute::{normalize_tag_name, Attribute, FieldValue, TaskStatus};
pub use model::entity::{
    Attachment, Entity, EntityData, HasRelations, Note, Tag, Task, User,
};
pub use model::ids::{EntityKey, EntityKind};
pub use notify::{ChangeEvent, ChangeListener, ChangeNotifier, ChangeOp, ChangeRecorder, Field};
pub use relation::association::{
    Association, ManyToMany, OneToMany, ReferenceSlot, RelationSlot,
};
pub use relation::lazy::{LazyRelation, LoadState, PreloadedMembers, RelationLoader};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
