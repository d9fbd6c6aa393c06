//! Schema planner: additive diff of requested bundles/fields against storage.
//!
//! For each model entry, in document order:
//! - bundle absent: create bundle, then every parseable field in listed
//!   order, then the body field when requested;
//! - bundle present: create only the missing fields, always refresh
//!   label/description (rename is allowed), attach the body field when
//!   requested and not yet present.
//!
//! Nothing is ever removed or retyped. A grammar error on one field skips
//! that field with a warning; the entry and its bundle still proceed.
//!
//! Besides the operations, planning produces the **effective schema**: per
//! bundle, the union of storage's current fields and the fields planned in
//! this call. The content planner coerces values against it.

use std::collections::HashMap;

use crate::context::ImportContext;
use crate::diagnostics::{grammar_warning, storage_failure, Warning, WarningCode};
use crate::document::ModelEntry;
use crate::error::StorageError;
use crate::grammar::{parse_field_type, FieldKind, ParsedFieldType};
use crate::plan::SchemaOp;
use crate::storage::{ContentStorage, EntityKind, FieldDefinition};

/// Machine name of the standard body field.
pub const BODY_FIELD_ID: &str = "body";

/// The standard rich-text body field attached when a model entry sets
/// `body: true`.
pub fn body_field() -> FieldDefinition {
    FieldDefinition {
        id: BODY_FIELD_ID.to_string(),
        label: "Body".to_string(),
        field_type: ParsedFieldType::new(FieldKind::RichText),
    }
}

/// Field types visible to the content planner: current storage state plus
/// everything planned in this call.
#[derive(Debug, Default)]
pub struct EffectiveSchema {
    bundles: HashMap<(EntityKind, String), HashMap<String, ParsedFieldType>>,
}

impl EffectiveSchema {
    pub fn contains_bundle(&self, kind: EntityKind, bundle: &str) -> bool {
        self.bundles.contains_key(&(kind, bundle.to_string()))
    }

    pub fn field(&self, kind: EntityKind, bundle: &str, field_id: &str) -> Option<&ParsedFieldType> {
        self.bundles
            .get(&(kind, bundle.to_string()))
            .and_then(|fields| fields.get(field_id))
    }

    pub fn fields(
        &self,
        kind: EntityKind,
        bundle: &str,
    ) -> Option<&HashMap<String, ParsedFieldType>> {
        self.bundles.get(&(kind, bundle.to_string()))
    }

    fn insert_field(&mut self, kind: EntityKind, bundle: &str, id: &str, ty: ParsedFieldType) {
        self.bundles
            .entry((kind, bundle.to_string()))
            .or_default()
            .insert(id.to_string(), ty);
    }

    fn insert_bundle(&mut self, kind: EntityKind, bundle: &str) {
        self.bundles.entry((kind, bundle.to_string())).or_default();
    }

    /// Load a bundle's field definitions from storage if not yet known.
    ///
    /// Returns whether the bundle exists (in storage or in this call's
    /// plan). Used by the content planner for entries targeting bundles the
    /// model section never mentioned.
    pub fn load_from_storage<S: ContentStorage>(
        &mut self,
        storage: &S,
        kind: EntityKind,
        bundle: &str,
    ) -> Result<bool, StorageError> {
        if self.contains_bundle(kind, bundle) {
            return Ok(true);
        }
        if !storage.bundle_exists(kind, bundle)? {
            return Ok(false);
        }
        self.insert_bundle(kind, bundle);
        for definition in storage.field_definitions(kind, bundle)? {
            self.insert_field(kind, bundle, &definition.id, definition.field_type);
        }
        Ok(true)
    }
}

/// Output of the schema planning stage.
#[derive(Debug, Default)]
pub struct SchemaPlan {
    pub ops: Vec<SchemaOp>,
    pub effective: EffectiveSchema,
}

/// Plan schema operations for the document's model entries.
///
/// Only reads from storage; execution happens in the engine so preview and
/// apply share this code path unchanged.
pub fn plan_schema<S: ContentStorage>(
    entries: &[ModelEntry],
    storage: &S,
    ctx: &mut ImportContext,
) -> SchemaPlan {
    let mut plan = SchemaPlan::default();

    for entry in entries {
        plan_entry(entry, storage, ctx, &mut plan);
    }

    plan
}

fn plan_entry<S: ContentStorage>(
    entry: &ModelEntry,
    storage: &S,
    ctx: &mut ImportContext,
    plan: &mut SchemaPlan,
) {
    let kind = entry.entity;
    let bundle = entry.bundle.as_str();

    // Parse field types up front; bad grammar drops the field, not the entry.
    let mut requested: Vec<(&str, &str, ParsedFieldType)> = Vec::new();
    for field in &entry.fields {
        match parse_field_type(&field.type_expr) {
            Ok(parsed) => {
                if requested.iter().any(|(id, _, _)| *id == field.id) {
                    ctx.warn(Warning::new(
                        WarningCode::InvalidValue,
                        format!(
                            "bundle '{}': duplicate field id '{}' skipped",
                            bundle, field.id
                        ),
                    ));
                    continue;
                }
                requested.push((field.id.as_str(), field.label.as_str(), parsed));
            }
            Err(err) => ctx.warn(grammar_warning(bundle, &field.id, &err)),
        }
    }

    let exists = match storage.bundle_exists(kind, bundle) {
        Ok(exists) => exists,
        Err(err) => {
            ctx.warn(storage_failure(
                &format!("look up bundle {}.{}", kind, bundle),
                &err,
            ));
            return;
        }
    };

    if !exists {
        plan.ops.push(SchemaOp::CreateBundle {
            kind,
            bundle: bundle.to_string(),
            label: entry.label.clone(),
            description: entry.description.clone(),
        });
        plan.effective.insert_bundle(kind, bundle);

        for (id, label, parsed) in &requested {
            push_create_field(plan, kind, bundle, id, label, parsed.clone());
        }
        if entry.body {
            plan.ops.push(SchemaOp::AttachBody {
                kind,
                bundle: bundle.to_string(),
            });
            plan.effective
                .insert_field(kind, bundle, BODY_FIELD_ID, body_field().field_type);
        }
        return;
    }

    // Existing bundle: refresh label/description, then add missing fields.
    let existing = match storage.field_definitions(kind, bundle) {
        Ok(definitions) => definitions,
        Err(err) => {
            ctx.warn(storage_failure(
                &format!("enumerate fields of {}.{}", kind, bundle),
                &err,
            ));
            return;
        }
    };

    plan.ops.push(SchemaOp::SetBundleInfo {
        kind,
        bundle: bundle.to_string(),
        label: entry.label.clone(),
        description: entry.description.clone(),
    });

    plan.effective.insert_bundle(kind, bundle);
    for definition in &existing {
        plan.effective
            .insert_field(kind, bundle, &definition.id, definition.field_type.clone());
    }

    for (id, label, parsed) in &requested {
        if existing.iter().any(|definition| definition.id == *id) {
            continue;
        }
        push_create_field(plan, kind, bundle, id, label, parsed.clone());
    }

    if entry.body && !existing.iter().any(|d| d.id == BODY_FIELD_ID) {
        plan.ops.push(SchemaOp::AttachBody {
            kind,
            bundle: bundle.to_string(),
        });
        plan.effective
            .insert_field(kind, bundle, BODY_FIELD_ID, body_field().field_type);
    }
}

fn push_create_field(
    plan: &mut SchemaPlan,
    kind: EntityKind,
    bundle: &str,
    id: &str,
    label: &str,
    field_type: ParsedFieldType,
) {
    plan.effective
        .insert_field(kind, bundle, id, field_type.clone());
    plan.ops.push(SchemaOp::CreateField {
        kind,
        bundle: bundle.to_string(),
        field: FieldDefinition {
            id: id.to_string(),
            label: label.to_string(),
            field_type,
        },
    });
}

// ============================================================================
// Tests
// ============================================================================
