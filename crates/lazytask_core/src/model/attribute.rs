//! Scalar attributes and the value type carried by change hooks.

use crate::model::ids::EntityKey;
use serde::{Deserialize, Serialize};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Todo,
    /// Work is in progress.
    InProgress,
    /// Completed successfully.
    Done,
    /// No longer actionable.
    Cancelled,
}

/// Scalar (non-relation) attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Title,
    Description,
    Status,
    Name,
    Email,
    Content,
    Filename,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::Name => "name",
            Self::Email => "email",
            Self::Content => "content",
            Self::Filename => "filename",
        }
    }
}

/// Value of a field before or after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum FieldValue {
    /// No value: empty reference, cleared optional text, or relation hook
    /// "old value".
    Unset,
    Entity(EntityKey),
    Text(String),
    Status(TaskStatus),
}

impl FieldValue {
    pub(crate) fn from_reference(reference: Option<EntityKey>) -> Self {
        reference.map_or(Self::Unset, Self::Entity)
    }

    pub(crate) fn from_optional_text(value: Option<&str>) -> Self {
        value.map_or(Self::Unset, |text| Self::Text(text.to_string()))
    }
}

/// Trims and lowercases a tag name. Returns `None` for blank input.
pub fn normalize_tag_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::normalize_tag_name;

    #[test]
    fn tag_names_are_trimmed_and_lowercased() {
        assert_eq!(normalize_tag_name("  Work "), Some("work".to_string()));
        assert_eq!(normalize_tag_name("   "), None);
    }
}
