//! In-memory storage collaborator.
//!
//! Reference implementation of `ContentStorage` backed by hash maps. Used
//! throughout the test suite and suitable for embedders that want a
//! self-contained repository without wiring up a real CMS backend.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::{ContentStorage, EntityKind, FieldDefinition};
use crate::value::FieldValue;

/// One stored bundle: display info plus field definitions in creation order.
#[derive(Clone, Debug)]
pub struct BundleRecord {
    pub label: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl BundleRecord {
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }
}

/// One stored content entity.
#[derive(Clone, Debug)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub bundle: String,
    pub values: BTreeMap<String, FieldValue>,
    pub path: Option<String>,
}

/// Hash-map backed repository.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bundles: HashMap<(EntityKind, String), BundleRecord>,
    entities: HashMap<Uuid, EntityRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a bundle, bypassing the planner. Test/setup helper.
    pub fn seed_bundle(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        label: &str,
        fields: Vec<FieldDefinition>,
    ) -> Result<(), StorageError> {
        self.create_bundle(kind, bundle, label, None)?;
        for field in &fields {
            self.create_field(kind, bundle, field)?;
        }
        Ok(())
    }

    pub fn bundle(&self, kind: EntityKind, bundle: &str) -> Option<&BundleRecord> {
        self.bundles.get(&(kind, bundle.to_string()))
    }

    pub fn entity(&self, id: Uuid) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }
}

impl ContentStorage for MemoryStorage {
    fn bundle_exists(&self, kind: EntityKind, bundle: &str) -> Result<bool, StorageError> {
        Ok(self.bundles.contains_key(&(kind, bundle.to_string())))
    }

    fn create_bundle(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<(), StorageError> {
        let key = (kind, bundle.to_string());
        if self.bundles.contains_key(&key) {
            return Err(StorageError::new(format!(
                "bundle {}.{} already exists",
                kind, bundle
            )));
        }
        self.bundles.insert(
            key,
            BundleRecord {
                label: label.to_string(),
                description: description.map(str::to_string),
                fields: Vec::new(),
            },
        );
        Ok(())
    }

    fn set_bundle_info(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<(), StorageError> {
        let record = self
            .bundles
            .get_mut(&(kind, bundle.to_string()))
            .ok_or_else(|| {
                StorageError::new(format!("bundle {}.{} does not exist", kind, bundle))
            })?;
        record.label = label.to_string();
        if description.is_some() {
            record.description = description.map(str::to_string);
        }
        Ok(())
    }

    fn field_definitions(
        &self,
        kind: EntityKind,
        bundle: &str,
    ) -> Result<Vec<FieldDefinition>, StorageError> {
        let record = self.bundles.get(&(kind, bundle.to_string())).ok_or_else(|| {
            StorageError::new(format!("bundle {}.{} does not exist", kind, bundle))
        })?;
        Ok(record.fields.clone())
    }

    fn create_field(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        field: &FieldDefinition,
    ) -> Result<(), StorageError> {
        let record = self
            .bundles
            .get_mut(&(kind, bundle.to_string()))
            .ok_or_else(|| {
                StorageError::new(format!("bundle {}.{} does not exist", kind, bundle))
            })?;
        if record.fields.iter().any(|f| f.id == field.id) {
            return Err(StorageError::new(format!(
                "field '{}' already exists on {}.{}",
                field.id, kind, bundle
            )));
        }
        record.fields.push(field.clone());
        Ok(())
    }

    fn create_entity(
        &mut self,
        kind: EntityKind,
        bundle: &str,
        values: &BTreeMap<String, FieldValue>,
        path: Option<&str>,
    ) -> Result<Uuid, StorageError> {
        if !self.bundles.contains_key(&(kind, bundle.to_string())) {
            return Err(StorageError::new(format!(
                "bundle {}.{} does not exist",
                kind, bundle
            )));
        }
        let id = Uuid::new_v4();
        self.entities.insert(
            id,
            EntityRecord {
                kind,
                bundle: bundle.to_string(),
                values: values.clone(),
                path: path.map(str::to_string),
            },
        );
        Ok(id)
    }

    fn set_entity_fields(
        &mut self,
        id: Uuid,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), StorageError> {
        let record = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| StorageError::new(format!("entity {} does not exist", id)))?;
        for (field, value) in values {
            record.values.insert(field.clone(), value.clone());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{FieldKind, ParsedFieldType};

    fn text_field(id: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: id.to_string(),
            field_type: ParsedFieldType::new(FieldKind::Text),
        }
    }

    #[test]
    fn test_duplicate_bundle_rejected() {
        let mut storage = MemoryStorage::new();
        storage
            .create_bundle(EntityKind::Node, "event", "Event", None)
            .unwrap();
        assert!(storage
            .create_bundle(EntityKind::Node, "event", "Event", None)
            .is_err());
        // Same bundle name under a different kind is a different key.
        assert!(storage
            .create_bundle(EntityKind::Paragraph, "event", "Event", None)
            .is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut storage = MemoryStorage::new();
        storage
            .create_bundle(EntityKind::Node, "event", "Event", None)
            .unwrap();
        storage
            .create_field(EntityKind::Node, "event", &text_field("location"))
            .unwrap();
        assert!(storage
            .create_field(EntityKind::Node, "event", &text_field("location"))
            .is_err());
    }

    #[test]
    fn test_entity_roundtrip_and_field_update() {
        let mut storage = MemoryStorage::new();
        storage
            .seed_bundle(EntityKind::Node, "event", "Event", vec![text_field("title")])
            .unwrap();

        let mut values = BTreeMap::new();
        values.insert("title".to_string(), FieldValue::Text("A".to_string()));
        let id = storage
            .create_entity(EntityKind::Node, "event", &values, Some("/events/a"))
            .unwrap();

        let mut update = BTreeMap::new();
        update.insert("title".to_string(), FieldValue::Text("B".to_string()));
        storage.set_entity_fields(id, &update).unwrap();

        let record = storage.entity(id).unwrap();
        assert_eq!(record.values["title"], FieldValue::Text("B".to_string()));
        assert_eq!(record.path.as_deref(), Some("/events/a"));
    }

    #[test]
    fn test_create_entity_requires_bundle() {
        let mut storage = MemoryStorage::new();
        let values = BTreeMap::new();
        assert!(storage
            .create_entity(EntityKind::Node, "missing", &values, None)
            .is_err());
    }
}
