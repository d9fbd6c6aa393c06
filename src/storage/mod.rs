//! Storage collaborator interface.
//!
//! The engine has no knowledge of where bundles, field definitions, and
//! content records actually live; it talks to a `ContentStorage`
//! implementation provided by the host. `memory::MemoryStorage` is an
//! in-crate implementation used by the test suite and by embedders that
//! want a self-contained repository.
//!
//! Concurrency control across overlapping import calls is deliberately the
//! host's problem: the trait is synchronous and the engine never locks.

pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::grammar::ParsedFieldType;
use crate::value::FieldValue;

/// Content kind a bundle belongs to.
///
/// `Node` bundles are standalone pages; `Paragraph` bundles are embeddable
/// components referenced from other content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Node,
    Paragraph,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Paragraph => "paragraph",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node" => Some(EntityKind::Node),
            "paragraph" => Some(EntityKind::Paragraph),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a content entity.
///
/// Apply mode yields `Persisted` refs carrying the storage-assigned id;
/// preview mode binds `Placeholder` refs under the entry's symbolic id so
/// pass 2 resolves identically without touching storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Persisted(Uuid),
    Placeholder(String),
}

impl EntityRef {
    /// Persisted id, if this ref was created in apply mode.
    pub fn persisted_id(&self) -> Option<Uuid> {
        match self {
            EntityRef::Persisted(id) => Some(*id),
            EntityRef::Placeholder(_) => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Persisted(id) => write!(f, "{}", id),
            EntityRef::Placeholder(symbolic) => write!(f, "preview:{}", symbolic),
        }
    }
}

/// One field definition as stored on (or planned for) a bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    pub field_type: ParsedFieldType,
}

/// The repository abstraction the engine plans and executes against.
///
/// All methods are fallible; the executor converts a failure on one call
/// into a warning and continues with the remaining operations.
pub trait ContentStorage {
    /// Whether a bundle already exists for the given kind.
    fn bundle_exists(&self, kind: EntityKind, bundle: &str) -> Result<bool, StorageError>;

    /// Create a bundle. Fails if it already exists.
    fn create_bundle(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Update label/description of an existing bundle.
    fn set_bundle_info(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Enumerate the bundle's current field definitions, in creation order.
    fn field_definitions(
        &self,
        kind: EntityKind,
        bundle: &str,
    ) -> Result<Vec<FieldDefinition>, StorageError>;

    /// Add a field to an existing bundle. Fails on duplicate field id.
    fn create_field(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        field: &FieldDefinition,
    ) -> Result<(), StorageError>;

    /// Create a content entity with the given field values and optional
    /// URL alias; returns the storage-assigned id.
    fn create_entity(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        values: &BTreeMap<String, FieldValue>,
        path: Option<&str>,
    ) -> Result<Uuid, StorageError>;

    /// Set a subset of fields on an already-created entity (pass-2
    /// reference writes).
    fn set_entity_fields(
        &mut self,
        id: Uuid,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), StorageError>;
}
