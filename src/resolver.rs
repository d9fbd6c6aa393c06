//! Reference-token resolution against the document symbol table.
//!
//! Reference-typed content values are strings of the form `@<symbolic-id>`,
//! or lists thereof. They are resolved in pass 2, after every entry in the
//! document has been bound in pass 1, so resolution is independent of
//! declaration order. Unresolved tokens are non-fatal: the caller records
//! a warning per token and the field is left empty.

use serde_json::Value as JsonValue;

use crate::context::ImportContext;
use crate::value::FieldValue;

/// Outcome of resolving one raw reference value.
#[derive(Debug, Default)]
pub struct ResolvedReference {
    /// The coerced value, absent when nothing resolved.
    pub value: Option<FieldValue>,
    /// Tokens that did not resolve (without the `@` prefix) or were not
    /// reference tokens at all.
    pub unresolved: Vec<String>,
}

/// Resolve a raw reference value against the symbol table.
///
/// Scalars are wrapped into a single-element list when the field is
/// multivalued; a list on a single-valued field keeps its first resolved
/// element.
pub fn resolve_reference_value(
    raw: &JsonValue,
    multivalued: bool,
    ctx: &ImportContext,
) -> ResolvedReference {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    let tokens: Vec<&JsonValue> = match raw {
        JsonValue::Array(items) => items.iter().collect(),
        scalar => vec![scalar],
    };

    for token in tokens {
        match reference_token(token) {
            Some(symbolic_id) => match ctx.resolve(symbolic_id) {
                Some(entity_ref) => resolved.push(FieldValue::Reference(entity_ref.clone())),
                None => unresolved.push(symbolic_id.to_string()),
            },
            None => unresolved.push(render_bad_token(token)),
        }
    }

    let value = if resolved.is_empty() {
        None
    } else if multivalued {
        Some(FieldValue::List(resolved))
    } else {
        Some(resolved.remove(0))
    };

    ResolvedReference { value, unresolved }
}

/// Extract the symbolic id from an `@id` token.
fn reference_token(value: &JsonValue) -> Option<&str> {
    let token = value.as_str()?.strip_prefix('@')?;
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn render_bad_token(value: &JsonValue) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EntityRef;
    use serde_json::json;
    use uuid::Uuid;

    fn ctx_with(bindings: &[(&str, EntityRef)]) -> ImportContext {
        let mut ctx = ImportContext::new(false);
        for (id, entity_ref) in bindings {
            ctx.bind(id, entity_ref.clone());
        }
        ctx
    }

    #[test]
    fn test_single_token_resolves() {
        let id = Uuid::new_v4();
        let ctx = ctx_with(&[("d1", EntityRef::Persisted(id))]);
        let result = resolve_reference_value(&json!("@d1"), false, &ctx);
        assert_eq!(
            result.value,
            Some(FieldValue::Reference(EntityRef::Persisted(id)))
        );
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_list_of_tokens_resolves_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ctx = ctx_with(&[
            ("a", EntityRef::Persisted(a)),
            ("b", EntityRef::Persisted(b)),
        ]);
        let result = resolve_reference_value(&json!(["@a", "@b"]), true, &ctx);
        assert_eq!(
            result.value,
            Some(FieldValue::List(vec![
                FieldValue::Reference(EntityRef::Persisted(a)),
                FieldValue::Reference(EntityRef::Persisted(b)),
            ]))
        );
    }

    #[test]
    fn test_unresolved_token_reported_and_omitted() {
        let a = Uuid::new_v4();
        let ctx = ctx_with(&[("a", EntityRef::Persisted(a))]);
        let result = resolve_reference_value(&json!(["@a", "@missing"]), true, &ctx);
        assert_eq!(result.unresolved, vec!["missing".to_string()]);
        assert_eq!(
            result.value,
            Some(FieldValue::List(vec![FieldValue::Reference(
                EntityRef::Persisted(a)
            )]))
        );
    }

    #[test]
    fn test_all_unresolved_yields_no_value() {
        let ctx = ctx_with(&[]);
        let result = resolve_reference_value(&json!("@missing"), false, &ctx);
        assert!(result.value.is_none());
        assert_eq!(result.unresolved, vec!["missing".to_string()]);
    }

    #[test]
    fn test_non_token_string_reported() {
        let ctx = ctx_with(&[]);
        let result = resolve_reference_value(&json!("not-a-token"), false, &ctx);
        assert!(result.value.is_none());
        assert_eq!(result.unresolved, vec!["not-a-token".to_string()]);
    }

    #[test]
    fn test_scalar_wrapped_for_multivalued_field() {
        let a = Uuid::new_v4();
        let ctx = ctx_with(&[("a", EntityRef::Persisted(a))]);
        let result = resolve_reference_value(&json!("@a"), true, &ctx);
        assert!(matches!(result.value, Some(FieldValue::List(_))));
    }

    #[test]
    fn test_placeholder_refs_resolve_in_preview() {
        let ctx = ctx_with(&[("d1", EntityRef::Placeholder("d1".to_string()))]);
        let result = resolve_reference_value(&json!("@d1"), false, &ctx);
        assert_eq!(
            result.value,
            Some(FieldValue::Reference(EntityRef::Placeholder(
                "d1".to_string()
            )))
        );
    }
}
