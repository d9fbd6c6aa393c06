//! Error types for the import pipeline.
//!
//! Only `ValidationError` is fatal: it aborts the call before any plan
//! executes. Everything else degrades to a `Warning` entry in the result
//! (see `diagnostics`), so a single bad field never takes down the batch.

use thiserror::Error;

/// Fatal document-shape error. No plan runs when one of these is raised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("document must contain a non-empty `model` or `content` array")]
    EmptyDocument,

    #[error("malformed document: {0}")]
    Shape(String),

    #[error("model entry {index}: `{key}` must be a non-empty string")]
    EmptyModelKey { index: usize, key: &'static str },

    #[error("content entry {index}: missing or empty `id`")]
    MissingContentId { index: usize },

    #[error("duplicate content id '{id}'")]
    DuplicateContentId { id: String },

    #[error("content entry '{id}': malformed type '{ty}' (expected \"node.<bundle>\" or \"paragraph.<bundle>\")")]
    MalformedContentType { id: String, ty: String },
}

/// Failure to parse one field-type grammar string.
///
/// Scoped to the offending field: the owning bundle is still created.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("unknown field type '{0}'")]
    UnknownBase(String),

    #[error("malformed type expression '{0}'")]
    Malformed(String),

    #[error("field type '{base}' does not take an argument")]
    UnexpectedArgument { base: String },

    #[error("field type '{base}' requires an argument")]
    MissingArgument { base: String },

    #[error("reference target '{0}' must be \"node.<bundle>\" or \"paragraph.<bundle>\"")]
    BadReferenceTarget(String),
}

/// Failure reported by the storage collaborator for one operation.
///
/// The executor converts these into warnings and continues with the rest
/// of the batch; there is no rollback of operations already applied.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct StorageError(pub String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
