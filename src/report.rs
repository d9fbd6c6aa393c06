//! Final result assembly.
//!
//! `success` is `false` only when a validation error prevented any plan
//! from running. Operations that already completed are real and are
//! reported, not hidden, so every other outcome is `success: true` with the
//! degradations listed in `warnings`.

use serde::Serialize;

use crate::context::ImportContext;
use crate::error::ValidationError;

/// One created (or previewed) entity in the result.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    /// Document-scoped symbolic id.
    pub id: String,
    /// Persisted id, or `preview:<id>` in preview mode.
    pub persisted_ref: String,
    /// `kind.bundle` of the entity.
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// Outcome of one import call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub summary: Vec<String>,
    pub warnings: Vec<String>,
    pub created_entities: Vec<CreatedEntity>,
    pub success: bool,
}

impl ImportResult {
    /// Result for a document that failed validation: one clear error, no
    /// partial effects.
    pub(crate) fn validation_failure(err: &ValidationError) -> Self {
        Self {
            summary: Vec::new(),
            warnings: vec![format!("validation error: {}", err)],
            created_entities: Vec::new(),
            success: false,
        }
    }

    pub(crate) fn from_context(ctx: ImportContext) -> Self {
        Self {
            summary: ctx.summary,
            warnings: ctx.warnings.iter().map(ToString::to_string).collect(),
            created_entities: ctx
                .created
                .into_iter()
                .map(|record| CreatedEntity {
                    id: record.symbolic_id,
                    persisted_ref: record.entity_ref.to_string(),
                    entity_type: record.entity_type,
                })
                .collect(),
            success: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_failure_shape() {
        let result = ImportResult::validation_failure(&ValidationError::EmptyDocument);
        assert!(!result.success);
        assert!(result.summary.is_empty());
        assert!(result.created_entities.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("validation error:"));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let result = ImportResult {
            summary: vec![],
            warnings: vec![],
            created_entities: vec![CreatedEntity {
                id: "d1".into(),
                persisted_ref: "preview:d1".into(),
                entity_type: "paragraph.event_detail".into(),
            }],
            success: true,
        };
        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(
            rendered["createdEntities"][0],
            json!({"id": "d1", "persistedRef": "preview:d1", "type": "paragraph.event_detail"})
        );
    }
}
