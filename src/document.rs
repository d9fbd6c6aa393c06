//! Serde document model for import calls.
//!
//! The top-level shape is `{ model: [ModelEntry], content: [ContentEntry] }`
//! with both arrays optional but at least one non-empty. Shape problems are
//! the only fatal condition in the pipeline: they raise a
//! `ValidationError` before any plan executes.
//!
//! Field `type` strings are kept raw here and parsed per field by
//! `grammar`, so a bad grammar string degrades to a per-field warning
//! instead of failing the whole document.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ValidationError;
use crate::storage::EntityKind;

/// A parsed import document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub model: Vec<ModelEntry>,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

/// One requested bundle and its fields.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelEntry {
    pub bundle: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub entity: EntityKind,
    /// Attach the standard rich-text `body` field.
    #[serde(default)]
    pub body: bool,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Declarative description of one bundle attribute.
#[derive(Clone, Debug, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    /// Compact grammar string, parsed by `grammar::parse_field_type`.
    #[serde(rename = "type")]
    pub type_expr: String,
}

/// One content instance, identified by a document-scoped symbolic id.
#[derive(Clone, Debug, Deserialize)]
pub struct ContentEntry {
    pub id: String,
    /// Target bundle as `kind.bundle`, e.g. `node.event`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Optional URL alias.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, JsonValue>,
}

impl ContentEntry {
    /// Split the `type` key into its kind and bundle parts.
    pub fn target(&self) -> Option<(EntityKind, &str)> {
        let (kind, bundle) = self.ty.split_once('.')?;
        let kind = EntityKind::parse(kind)?;
        if bundle.is_empty() {
            return None;
        }
        Some((kind, bundle))
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Parse and validate a raw JSON document.
pub fn parse_document(raw: &JsonValue) -> Result<ImportDocument, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::NotAnObject);
    }
    let document: ImportDocument = serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::Shape(e.to_string()))?;
    validate(&document)?;
    Ok(document)
}

fn validate(document: &ImportDocument) -> Result<(), ValidationError> {
    if document.model.is_empty() && document.content.is_empty() {
        return Err(ValidationError::EmptyDocument);
    }

    for (index, entry) in document.model.iter().enumerate() {
        if entry.bundle.trim().is_empty() {
            return Err(ValidationError::EmptyModelKey {
                index,
                key: "bundle",
            });
        }
        if entry.label.trim().is_empty() {
            return Err(ValidationError::EmptyModelKey { index, key: "label" });
        }
    }

    let mut seen_ids = HashSet::new();
    for (index, entry) in document.content.iter().enumerate() {
        if entry.id.trim().is_empty() {
            return Err(ValidationError::MissingContentId { index });
        }
        if !seen_ids.insert(entry.id.as_str()) {
            return Err(ValidationError::DuplicateContentId {
                id: entry.id.clone(),
            });
        }
        if entry.target().is_none() {
            return Err(ValidationError::MalformedContentType {
                id: entry.id.clone(),
                ty: entry.ty.clone(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_rejected() {
        assert_eq!(
            parse_document(&json!({})).unwrap_err(),
            ValidationError::EmptyDocument
        );
        assert_eq!(
            parse_document(&json!({"model": [], "content": []})).unwrap_err(),
            ValidationError::EmptyDocument
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            parse_document(&json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn test_model_entry_defaults() {
        let doc = parse_document(&json!({
            "model": [{"bundle": "event", "label": "Event"}]
        }))
        .unwrap();
        let entry = &doc.model[0];
        assert_eq!(entry.entity, EntityKind::Node);
        assert!(!entry.body);
        assert!(entry.fields.is_empty());
        assert!(entry.description.is_none());
    }

    #[test]
    fn test_blank_label_rejected() {
        let err = parse_document(&json!({
            "model": [{"bundle": "event", "label": "  "}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyModelKey { index: 0, key: "label" }
        );
    }

    #[test]
    fn test_duplicate_content_id_rejected() {
        let err = parse_document(&json!({
            "content": [
                {"id": "a", "type": "node.event", "values": {}},
                {"id": "a", "type": "node.event", "values": {}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateContentId { id: "a".into() });
    }

    #[test]
    fn test_malformed_content_type_rejected() {
        for bad in ["event", "block.event", "node.", "node"] {
            let err = parse_document(&json!({
                "content": [{"id": "a", "type": bad, "values": {}}]
            }))
            .unwrap_err();
            assert!(matches!(err, ValidationError::MalformedContentType { .. }));
        }
    }

    #[test]
    fn test_content_target_split() {
        let doc = parse_document(&json!({
            "content": [{"id": "d1", "type": "paragraph.event_detail", "values": {"title": "A"}}]
        }))
        .unwrap();
        let (kind, bundle) = doc.content[0].target().unwrap();
        assert_eq!(kind, EntityKind::Paragraph);
        assert_eq!(bundle, "event_detail");
    }
}
