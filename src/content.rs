//! Content planner: two-pass creation with deferred reference writes.
//!
//! References may point forward or backward within the document, so content
//! runs in two passes:
//!
//! 1. every entry is created with its coerced non-reference values, and its
//!    symbolic id is bound to the resulting entity ref (a persisted id in
//!    apply mode, a placeholder in preview mode);
//! 2. entries with reference-kind values resolve their `@id` tokens against
//!    the now-complete symbol table and write them with a set-fields call.
//!
//! A storage failure on one operation becomes a warning and the batch
//! continues; a failed pass-1 create leaves the symbolic id unbound, so
//! later references to it degrade to unresolved-reference warnings.

use std::collections::{BTreeMap, HashSet};

use crate::context::ImportContext;
use crate::diagnostics::{
    invalid_value, missing_required, storage_failure, unknown_bundle, unknown_field,
    unresolved_reference,
};
use crate::document::ContentEntry;
use crate::plan::{ContentOp, ImportPlan};
use crate::resolver::resolve_reference_value;
use crate::schema::EffectiveSchema;
use crate::storage::{ContentStorage, EntityRef};
use crate::value::{coerce_value, FieldValue};

/// Run both content passes, executing (or previewing) each operation as it
/// is planned and appending it to the plan in document order.
pub fn run_content_passes<S: ContentStorage>(
    entries: &[ContentEntry],
    effective: &mut EffectiveSchema,
    storage: &mut S,
    ctx: &mut ImportContext,
    plan: &mut ImportPlan,
) {
    let mut skipped: HashSet<&str> = HashSet::new();

    for entry in entries {
        if !pass_one(entry, effective, storage, ctx, plan) {
            skipped.insert(entry.id.as_str());
        }
    }

    for entry in entries {
        if skipped.contains(entry.id.as_str()) {
            continue;
        }
        pass_two(entry, effective, storage, ctx, plan);
    }
}

/// Create one entry with its non-reference values. Returns `false` when the
/// entry was skipped entirely (unknown bundle or schema lookup failure).
fn pass_one<S: ContentStorage>(
    entry: &ContentEntry,
    effective: &mut EffectiveSchema,
    storage: &mut S,
    ctx: &mut ImportContext,
    plan: &mut ImportPlan,
) -> bool {
    // `target()` was checked during document validation.
    let Some((kind, bundle)) = entry.target() else {
        return false;
    };

    match effective.load_from_storage(&*storage, kind, bundle) {
        Ok(true) => {}
        Ok(false) => {
            ctx.warn(unknown_bundle(&entry.id, &entry.ty));
            return false;
        }
        Err(err) => {
            ctx.warn(storage_failure(
                &format!("look up bundle {} for content '{}'", entry.ty, entry.id),
                &err,
            ));
            return false;
        }
    }

    let mut values: BTreeMap<String, FieldValue> = BTreeMap::new();
    for (field_id, raw) in &entry.values {
        let Some(field_type) = effective.field(kind, bundle, field_id) else {
            ctx.warn(unknown_field(&entry.id, field_id));
            continue;
        };
        if field_type.kind.is_reference() {
            // Deferred to pass 2.
            continue;
        }
        match coerce_value(raw, field_type) {
            Ok(value) => {
                values.insert(field_id.clone(), value);
            }
            Err(detail) => ctx.warn(invalid_value(&entry.id, field_id, &detail)),
        }
    }

    // Required fields with no value are left empty, warned, and non-fatal.
    if let Some(fields) = effective.fields(kind, bundle) {
        let mut missing: Vec<&str> = fields
            .iter()
            .filter(|(id, ty)| ty.required && !entry.values.contains_key(*id))
            .map(|(id, _)| id.as_str())
            .collect();
        missing.sort_unstable();
        for field_id in missing {
            ctx.warn(missing_required(&entry.id, field_id));
        }
    }

    let op = ContentOp::CreateEntity {
        symbolic_id: entry.id.clone(),
        kind,
        bundle: bundle.to_string(),
        path: entry.path.clone(),
        values: values.clone(),
    };
    let description = op.describe();
    plan.content_ops.push(op);

    if ctx.preview {
        ctx.record(description);
        ctx.bind(&entry.id, EntityRef::Placeholder(entry.id.clone()));
        ctx.record_created(
            &entry.id,
            EntityRef::Placeholder(entry.id.clone()),
            entry.ty.clone(),
        );
        return true;
    }

    match storage.create_entity(kind, bundle, &values, entry.path.as_deref()) {
        Ok(id) => {
            ctx.record(description);
            ctx.bind(&entry.id, EntityRef::Persisted(id));
            ctx.record_created(&entry.id, EntityRef::Persisted(id), entry.ty.clone());
            true
        }
        Err(err) => {
            ctx.warn(storage_failure(&description, &err));
            // Keep the entry in pass 2's view: references FROM it are still
            // skipped there because its symbolic id is unbound.
            true
        }
    }
}

/// Resolve and write one entry's reference fields.
fn pass_two<S: ContentStorage>(
    entry: &ContentEntry,
    effective: &EffectiveSchema,
    storage: &mut S,
    ctx: &mut ImportContext,
    plan: &mut ImportPlan,
) {
    let Some((kind, bundle)) = entry.target() else {
        return;
    };

    let mut values: BTreeMap<String, FieldValue> = BTreeMap::new();
    for (field_id, raw) in &entry.values {
        let Some(field_type) = effective.field(kind, bundle, field_id) else {
            // Already warned in pass 1.
            continue;
        };
        if !field_type.kind.is_reference() {
            continue;
        }
        let resolved = resolve_reference_value(raw, field_type.multivalued, ctx);
        for token in &resolved.unresolved {
            ctx.warn(unresolved_reference(&entry.id, field_id, token));
        }
        if let Some(value) = resolved.value {
            values.insert(field_id.clone(), value);
        }
    }

    if values.is_empty() {
        return;
    }

    let op = ContentOp::SetReferences {
        symbolic_id: entry.id.clone(),
        values: values.clone(),
    };
    let description = op.describe();
    plan.content_ops.push(op);

    if ctx.preview {
        ctx.record(description);
        return;
    }

    let Some(id) = ctx.resolve(&entry.id).and_then(EntityRef::persisted_id) else {
        ctx.warn(storage_failure(
            &description,
            &crate::error::StorageError::new(format!(
                "entity '{}' was not created in pass 1",
                entry.id
            )),
        ));
        return;
    };

    match storage.set_entity_fields(id, &values) {
        Ok(()) => ctx.record(description),
        Err(err) => ctx.warn(storage_failure(&description, &err)),
    }
}
