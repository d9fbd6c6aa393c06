//! Import plan operation records.
//!
//! The plan is a linear, document-ordered record of what the call will do:
//! schema operations first, then content operations (pass-1 creates and
//! pass-2 reference writes). Summary lines come from `describe()`, so the
//! plan is also the single source of truth for reporting.

use std::collections::BTreeMap;

use crate::storage::{EntityKind, FieldDefinition};
use crate::value::FieldValue;

/// One additive schema operation.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaOp {
    CreateBundle {
        kind: EntityKind,
        bundle: String,
        label: String,
        description: Option<String>,
    },
    /// Label/description update for an existing bundle (rename is allowed;
    /// removal and retype are not).
    SetBundleInfo {
        kind: EntityKind,
        bundle: String,
        label: String,
        description: Option<String>,
    },
    CreateField {
        kind: EntityKind,
        bundle: String,
        field: FieldDefinition,
    },
    /// Attach the standard rich-text `body` field.
    AttachBody { kind: EntityKind, bundle: String },
}

impl SchemaOp {
    /// Summary line for this operation.
    pub fn describe(&self) -> String {
        match self {
            SchemaOp::CreateBundle {
                kind,
                bundle,
                label,
                ..
            } => format!("create bundle {}.{} ('{}')", kind, bundle, label),
            SchemaOp::SetBundleInfo {
                kind,
                bundle,
                label,
                ..
            } => format!("update bundle {}.{} ('{}')", kind, bundle, label),
            SchemaOp::CreateField {
                kind,
                bundle,
                field,
            } => format!("create field {} on {}.{}", field.id, kind, bundle),
            SchemaOp::AttachBody { kind, bundle } => {
                format!("attach body field to {}.{}", kind, bundle)
            }
        }
    }
}

/// One content operation.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentOp {
    /// Pass 1: create the entity with its non-reference values.
    CreateEntity {
        symbolic_id: String,
        kind: EntityKind,
        bundle: String,
        path: Option<String>,
        values: BTreeMap<String, FieldValue>,
    },
    /// Pass 2: write resolved reference fields onto the created entity.
    SetReferences {
        symbolic_id: String,
        values: BTreeMap<String, FieldValue>,
    },
}

impl ContentOp {
    /// Summary line for this operation.
    ///
    /// Deliberately value-free so preview and apply summaries compare equal
    /// apart from the preview tag.
    pub fn describe(&self) -> String {
        match self {
            ContentOp::CreateEntity {
                symbolic_id,
                kind,
                bundle,
                ..
            } => format!("create content {} ({}.{})", symbolic_id, kind, bundle),
            ContentOp::SetReferences {
                symbolic_id,
                values,
            } => {
                let fields: Vec<&str> = values.keys().map(String::as_str).collect();
                format!("set references on {} ({})", symbolic_id, fields.join(", "))
            }
        }
    }
}

/// The full plan for one import call, built fresh per call.
#[derive(Clone, Debug, Default)]
pub struct ImportPlan {
    pub schema_ops: Vec<SchemaOp>,
    pub content_ops: Vec<ContentOp>,
}

impl ImportPlan {
    pub fn op_count(&self) -> usize {
        self.schema_ops.len() + self.content_ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.op_count() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{FieldKind, ParsedFieldType};

    #[test]
    fn test_schema_op_descriptions() {
        let op = SchemaOp::CreateBundle {
            kind: EntityKind::Node,
            bundle: "event".into(),
            label: "Event".into(),
            description: None,
        };
        assert_eq!(op.describe(), "create bundle node.event ('Event')");

        let field = SchemaOp::CreateField {
            kind: EntityKind::Node,
            bundle: "event".into(),
            field: FieldDefinition {
                id: "location".into(),
                label: "Location".into(),
                field_type: ParsedFieldType::new(FieldKind::Text),
            },
        };
        assert_eq!(field.describe(), "create field location on node.event");
    }

    #[test]
    fn test_set_references_lists_fields() {
        let mut values = BTreeMap::new();
        values.insert(
            "details".to_string(),
            FieldValue::List(vec![]),
        );
        let op = ContentOp::SetReferences {
            symbolic_id: "e1".into(),
            values,
        };
        assert_eq!(op.describe(), "set references on e1 (details)");
    }
}
