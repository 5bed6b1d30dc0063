//! Reference domain model.
//!
//! A reference is a structured citation the assistant attaches to an answer,
//! pointing at a content entity of the portal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of portal entity a reference points to.
///
/// The five known kinds form a closed set. Anything else the backend sends
/// is kept verbatim in `Unknown` so that decoding never fails on a new kind;
/// resolvers treat it as "not navigable".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Activity,
    News,
    Project,
    Expert,
    Product,
    Unknown(String),
}

impl EntityType {
    /// All entity kinds the portal knows how to link to.
    #[cfg(test)]
    pub(crate) const KNOWN: [EntityType; 5] = [
        EntityType::Activity,
        EntityType::News,
        EntityType::Project,
        EntityType::Expert,
        EntityType::Product,
    ];

    /// Wire name of the entity kind.
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Activity => "activity",
            EntityType::News => "news",
            EntityType::Project => "project",
            EntityType::Expert => "expert",
            EntityType::Product => "product",
            EntityType::Unknown(raw) => raw,
        }
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "activity" => EntityType::Activity,
            "news" => EntityType::News,
            "project" => EntityType::Project,
            "expert" => EntityType::Expert,
            "product" => EntityType::Product,
            _ => EntityType::Unknown(value),
        }
    }
}

impl From<&str> for EntityType {
    fn from(value: &str) -> Self {
        EntityType::from(value.to_string())
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citation attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Kind of entity the citation points to.
    pub entity_type: EntityType,
    /// Portal identifier of the entity.
    pub entity_id: i64,
    /// Display title of the entity.
    pub title: String,
    /// Localized name of the entity kind (e.g. "活动").
    pub type_name: String,
}

impl Reference {
    pub fn new(
        entity_type: impl Into<EntityType>,
        entity_id: i64,
        title: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
            title: title.into(),
            type_name: type_name.into(),
        }
    }
}
