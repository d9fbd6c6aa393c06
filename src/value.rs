//! Coerced field values.
//!
//! Raw JSON values from a content entry are mapped into a closed set of
//! variants chosen from the parsed field grammar at coercion time. The
//! storage collaborator only ever sees `FieldValue`s, never raw JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::grammar::{FieldKind, ParsedFieldType};
use crate::storage::EntityRef;

/// A coerced content value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Reference(EntityRef),
    List(Vec<FieldValue>),
}

// ============================================================================
// Coercion
// ============================================================================

/// Coerce a raw JSON value to the field's kind.
///
/// When the field is multivalued, scalars are wrapped into a
/// single-element list and arrays are coerced element-wise. Errors carry a
/// human-readable detail for the warning buffer; the caller drops the value.
///
/// Reference kinds are not handled here: the content planner defers them to
/// pass 2 (see `resolver`).
pub fn coerce_value(raw: &JsonValue, field_type: &ParsedFieldType) -> Result<FieldValue, String> {
    debug_assert!(!field_type.kind.is_reference());

    if field_type.multivalued {
        let items = match raw {
            JsonValue::Array(items) => items.iter().collect::<Vec<_>>(),
            scalar => vec![scalar],
        };
        let mut coerced = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let value = coerce_scalar(item, &field_type.kind)
                .map_err(|detail| format!("element {}: {}", index, detail))?;
            coerced.push(value);
        }
        return Ok(FieldValue::List(coerced));
    }

    if let JsonValue::Array(_) = raw {
        return Err("expected a single value, got a list".to_string());
    }
    coerce_scalar(raw, &field_type.kind)
}

fn coerce_scalar(raw: &JsonValue, kind: &FieldKind) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text
        | FieldKind::LongText
        | FieldKind::RichText
        | FieldKind::Email
        | FieldKind::Phone
        | FieldKind::Link
        | FieldKind::Image
        | FieldKind::File => coerce_text(raw),
        FieldKind::Integer => coerce_integer(raw),
        FieldKind::Decimal => coerce_decimal(raw),
        FieldKind::Boolean => coerce_boolean(raw),
        FieldKind::DateTime => coerce_datetime(raw),
        FieldKind::DateRange => coerce_daterange(raw),
        FieldKind::TaxonomyReference { .. }
        | FieldKind::ParagraphReference { .. }
        | FieldKind::GenericReference { .. } => {
            Err("reference values are resolved in pass 2".to_string())
        }
    }
}

fn coerce_text(raw: &JsonValue) -> Result<FieldValue, String> {
    match raw {
        JsonValue::String(s) => Ok(FieldValue::Text(s.clone())),
        JsonValue::Number(n) => Ok(FieldValue::Text(n.to_string())),
        other => Err(format!("expected text, got {}", json_kind(other))),
    }
}

fn coerce_integer(raw: &JsonValue) -> Result<FieldValue, String> {
    match raw {
        JsonValue::Number(n) => n
            .as_i64()
            .map(|i| FieldValue::Number(i as f64))
            .ok_or_else(|| format!("expected an integer, got {}", n)),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| FieldValue::Number(i as f64))
            .map_err(|_| format!("expected an integer, got '{}'", s)),
        other => Err(format!("expected an integer, got {}", json_kind(other))),
    }
}

fn coerce_decimal(raw: &JsonValue) -> Result<FieldValue, String> {
    match raw {
        JsonValue::Number(n) => n
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| format!("expected a number, got {}", n)),
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|_| format!("expected a number, got '{}'", s)),
        other => Err(format!("expected a number, got {}", json_kind(other))),
    }
}

fn coerce_boolean(raw: &JsonValue) -> Result<FieldValue, String> {
    match raw {
        JsonValue::Bool(b) => Ok(FieldValue::Bool(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(FieldValue::Bool(false)),
            Some(1) => Ok(FieldValue::Bool(true)),
            _ => Err(format!("expected a boolean, got {}", n)),
        },
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(FieldValue::Bool(true)),
            "false" | "0" => Ok(FieldValue::Bool(false)),
            _ => Err(format!("expected a boolean, got '{}'", s)),
        },
        other => Err(format!("expected a boolean, got {}", json_kind(other))),
    }
}

fn coerce_datetime(raw: &JsonValue) -> Result<FieldValue, String> {
    let JsonValue::String(s) = raw else {
        return Err(format!("expected a datetime string, got {}", json_kind(raw)));
    };
    if is_valid_datetime(s) {
        Ok(FieldValue::Text(s.clone()))
    } else {
        Err(format!("'{}' is not a valid datetime", s))
    }
}

/// A date range is an object with `start` and `end` datetime strings; it
/// coerces to a two-element list.
fn coerce_daterange(raw: &JsonValue) -> Result<FieldValue, String> {
    let JsonValue::Object(map) = raw else {
        return Err(format!(
            "expected an object with 'start' and 'end', got {}",
            json_kind(raw)
        ));
    };
    let mut bounds = Vec::with_capacity(2);
    for key in ["start", "end"] {
        let bound = map
            .get(key)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| format!("missing '{}' datetime", key))?;
        if !is_valid_datetime(bound) {
            return Err(format!("'{}' is not a valid datetime for '{}'", bound, key));
        }
        bounds.push(FieldValue::Text(bound.to_string()));
    }
    Ok(FieldValue::List(bounds))
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD` date.
fn is_valid_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_field_type;
    use serde_json::json;

    fn ty(expr: &str) -> ParsedFieldType {
        parse_field_type(expr).unwrap()
    }

    #[test]
    fn test_text_passthrough() {
        assert_eq!(
            coerce_value(&json!("hello"), &ty("string")).unwrap(),
            FieldValue::Text("hello".to_string())
        );
    }

    #[test]
    fn test_number_stringified_for_text() {
        assert_eq!(
            coerce_value(&json!(42), &ty("string")).unwrap(),
            FieldValue::Text("42".to_string())
        );
    }

    #[test]
    fn test_multivalued_wraps_scalar() {
        assert_eq!(
            coerce_value(&json!("a"), &ty("string[]")).unwrap(),
            FieldValue::List(vec![FieldValue::Text("a".to_string())])
        );
    }

    #[test]
    fn test_multivalued_coerces_elementwise() {
        assert_eq!(
            coerce_value(&json!([1, 2]), &ty("integer[]")).unwrap(),
            FieldValue::List(vec![FieldValue::Number(1.0), FieldValue::Number(2.0)])
        );
    }

    #[test]
    fn test_list_rejected_for_single_valued() {
        assert!(coerce_value(&json!(["a"]), &ty("string")).is_err());
    }

    #[test]
    fn test_boolean_normalization() {
        for truthy in [json!(true), json!(1), json!("true"), json!("1")] {
            assert_eq!(
                coerce_value(&truthy, &ty("boolean")).unwrap(),
                FieldValue::Bool(true)
            );
        }
        for falsy in [json!(false), json!(0), json!("false"), json!("0")] {
            assert_eq!(
                coerce_value(&falsy, &ty("boolean")).unwrap(),
                FieldValue::Bool(false)
            );
        }
        assert!(coerce_value(&json!("yes please"), &ty("boolean")).is_err());
    }

    #[test]
    fn test_integer_rejects_fraction() {
        assert!(coerce_value(&json!(1.5), &ty("integer")).is_err());
        assert_eq!(
            coerce_value(&json!("7"), &ty("integer")).unwrap(),
            FieldValue::Number(7.0)
        );
    }

    #[test]
    fn test_datetime_validation() {
        assert!(coerce_value(&json!("2026-03-01"), &ty("datetime")).is_ok());
        assert!(coerce_value(&json!("2026-03-01T10:30:00"), &ty("datetime")).is_ok());
        assert!(coerce_value(&json!("2026-03-01T10:30:00+01:00"), &ty("datetime")).is_ok());
        assert!(coerce_value(&json!("next tuesday"), &ty("datetime")).is_err());
    }

    #[test]
    fn test_daterange_bounds() {
        let range = json!({"start": "2026-03-01", "end": "2026-03-02"});
        assert_eq!(
            coerce_value(&range, &ty("daterange")).unwrap(),
            FieldValue::List(vec![
                FieldValue::Text("2026-03-01".to_string()),
                FieldValue::Text("2026-03-02".to_string()),
            ])
        );
        assert!(coerce_value(&json!({"start": "2026-03-01"}), &ty("daterange")).is_err());
    }
}
