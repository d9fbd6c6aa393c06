//! Warning taxonomy shared across the import stages.
//!
//! A single warning type is used by the schema planner, content planner,
//! resolver, and executor. Warnings are non-fatal by definition: the call
//! still returns `success: true` and the summary reflects whatever was
//! actually applied.

use std::fmt;

use crate::error::{GrammarError, StorageError};

/// Category of a recorded warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningCode {
    /// A field-type grammar string failed to parse; the field was skipped.
    Grammar,
    /// A content value named a field the bundle does not define.
    UnknownField,
    /// A field marked `!` in the grammar had no value in the entry.
    MissingRequiredField,
    /// A content value could not be coerced to the field's kind.
    InvalidValue,
    /// An `@id` token did not resolve after both passes.
    UnresolvedReference,
    /// A content entry targeted a bundle absent from storage and the plan.
    UnknownBundle,
    /// The storage collaborator rejected one operation.
    StorageOperation,
}

impl WarningCode {
    pub fn label(self) -> &'static str {
        match self {
            WarningCode::Grammar => "grammar error",
            WarningCode::UnknownField => "unknown field",
            WarningCode::MissingRequiredField => "missing required field",
            WarningCode::InvalidValue => "invalid value",
            WarningCode::UnresolvedReference => "unresolved reference",
            WarningCode::UnknownBundle => "unknown bundle",
            WarningCode::StorageOperation => "storage operation failed",
        }
    }
}

/// One non-fatal condition recorded during an import call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.label(), self.message)
    }
}

// ============================================================================
// Convenience Builders
// ============================================================================

pub fn grammar_warning(bundle: &str, field: &str, err: &GrammarError) -> Warning {
    Warning::new(
        WarningCode::Grammar,
        format!("field '{}' on bundle '{}' skipped: {}", field, bundle, err),
    )
}

pub fn unknown_field(content_id: &str, field: &str) -> Warning {
    Warning::new(
        WarningCode::UnknownField,
        format!("content '{}': value for undefined field '{}' dropped", content_id, field),
    )
}

pub fn missing_required(content_id: &str, field: &str) -> Warning {
    Warning::new(
        WarningCode::MissingRequiredField,
        format!("content '{}': required field '{}' has no value", content_id, field),
    )
}

pub fn invalid_value(content_id: &str, field: &str, detail: &str) -> Warning {
    Warning::new(
        WarningCode::InvalidValue,
        format!("content '{}': field '{}': {}", content_id, field, detail),
    )
}

pub fn unresolved_reference(content_id: &str, field: &str, token: &str) -> Warning {
    Warning::new(
        WarningCode::UnresolvedReference,
        format!(
            "content '{}': field '{}': reference '@{}' did not resolve",
            content_id, field, token
        ),
    )
}

pub fn unknown_bundle(content_id: &str, ty: &str) -> Warning {
    Warning::new(
        WarningCode::UnknownBundle,
        format!("content '{}': bundle '{}' does not exist; entry skipped", content_id, ty),
    )
}

pub fn storage_failure(operation: &str, err: &StorageError) -> Warning {
    Warning::new(
        WarningCode::StorageOperation,
        format!("{}: {}", operation, err),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_label() {
        let w = unknown_field("e1", "bogus");
        let rendered = w.to_string();
        assert!(rendered.starts_with("unknown field:"));
        assert!(rendered.contains("'bogus'"));
        assert!(rendered.contains("'e1'"));
    }

    #[test]
    fn test_unresolved_reference_names_token() {
        let w = unresolved_reference("e1", "details", "missing");
        assert_eq!(w.code, WarningCode::UnresolvedReference);
        assert!(w.message.contains("@missing"));
    }
}
