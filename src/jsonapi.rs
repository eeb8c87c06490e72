//! Serde types for JSON:API wire documents.
//!
//! These reproduce the wire format exactly: documents carry primary `data`
//! (one resource or an array), optional side-loaded `included` resources and
//! pagination `links`. They are kept separate from domain objects so
//! deserialization stays mechanical.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A complete JSON:API document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<PrimaryData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub included: Option<Vec<ResourceObject>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub links: Option<DocumentLinks>,
}

impl Document {
  /// Flatten primary data into a vector, regardless of cardinality.
  pub fn data_as_vec(self) -> Vec<ResourceObject> {
    match self.data {
      None => Vec::new(),
      Some(PrimaryData::Single(resource)) => vec![resource],
      Some(PrimaryData::Multiple(resources)) => resources,
    }
  }
}

/// Primary document data: one resource object or an ordered array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryData {
  Single(ResourceObject),
  Multiple(Vec<ResourceObject>),
}

/// Document-level links, including the pagination cursor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentLinks {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,
  #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
  pub self_link: Option<String>,
}

/// One resource object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceObject {
  #[serde(rename = "type")]
  pub resource_type: String,
  pub id: String,
  #[serde(default, skip_serializing_if = "Value::is_null")]
  pub attributes: Value,
  #[serde(default, skip_serializing_if = "HashMap::is_empty")]
  pub relationships: HashMap<String, Relationship>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub links: Option<ResourceLinks>,
}

impl ResourceObject {
  pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      resource_type: resource_type.into(),
      id: id.into(),
      attributes: Value::Null,
      relationships: HashMap::new(),
      links: None,
    }
  }

  /// The cache key identifying this resource.
  pub fn key(&self) -> ResourceKey {
    ResourceKey::new(&self.resource_type, &self.id)
  }

  /// A named resource-level link (`self`, or anything the server exposes).
  pub fn link(&self, name: &str) -> Option<&str> {
    let links = self.links.as_ref()?;
    match name {
      "self" => links.self_link.as_deref(),
      other => links.other.get(other).and_then(Value::as_str),
    }
  }
}

/// Resource-level links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceLinks {
  #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
  pub self_link: Option<String>,
  #[serde(flatten)]
  pub other: HashMap<String, Value>,
}

/// One named relationship on a resource object.
///
/// `links.related` drives lazy resolution over the network; inline linkage
/// `data` points at side-loaded resources resolvable through `included`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub links: Option<RelationshipLinks>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Linkage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelationshipLinks {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub related: Option<String>,
}

/// Inline relationship linkage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Linkage {
  Single(ResourceLinkage),
  Many(Vec<ResourceLinkage>),
}

/// A `{type, id}` pointer into `included`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceLinkage {
  #[serde(rename = "type")]
  pub resource_type: String,
  pub id: String,
}

/// Uniquely identifies a cached resource. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
  pub resource_type: String,
  pub id: String,
}

impl ResourceKey {
  pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      resource_type: resource_type.into(),
      id: id.into(),
    }
  }

  /// Composite storage key, `type_id`.
  pub fn composite(&self) -> String {
    format!("{}_{}", self.resource_type, self.id)
  }
}
