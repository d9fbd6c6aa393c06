//! model-import: declarative content-model import engine
//!
//! Given a JSON document describing entity-type schemas (bundles and their
//! fields) and concrete content instances, the engine plans and applies
//! their creation against a content repository, resolving `@id`
//! cross-references between items declared in the same document, with a
//! preview mode that computes the identical plan without mutating storage.
//!
//! # Pipeline
//!
//! ```text
//! JSON document          Engine stages                     Storage collaborator
//! ─────────────          ─────────────────────────────     ────────────────────
//! model: [...]      →    grammar parse + schema diff   →   create bundle/field
//! content: [...]    →    pass 1: coerce + create       →   create entity
//!                   →    pass 2: resolve @refs         →   set entity fields
//!                        result: summary + warnings
//! ```
//!
//! Only a malformed document aborts a call; every other condition degrades
//! to a warning and the call reports whatever was actually applied.
//!
//! # Example
//!
//! ```
//! use model_import::{ImportEngine, MemoryStorage};
//! use serde_json::json;
//!
//! let mut engine = ImportEngine::new(MemoryStorage::new());
//! let result = engine.import(
//!     &json!({
//!         "model": [{
//!             "bundle": "event",
//!             "label": "Event",
//!             "fields": [{"id": "location", "label": "Location", "type": "string"}]
//!         }]
//!     }),
//!     false,
//! );
//! assert!(result.success);
//! assert_eq!(result.summary.len(), 2);
//! ```

pub mod content;
pub mod context;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod plan;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod storage;
pub mod value;

// Re-export the surface most embedders need.
pub use context::PREVIEW_TAG;
pub use diagnostics::{Warning, WarningCode};
pub use document::{ContentEntry, FieldSpec, ImportDocument, ModelEntry};
pub use engine::ImportEngine;
pub use error::{GrammarError, StorageError, ValidationError};
pub use grammar::{parse_field_type, FieldKind, ParsedFieldType};
pub use report::{CreatedEntity, ImportResult};
pub use storage::memory::MemoryStorage;
pub use storage::{ContentStorage, EntityKind, EntityRef, FieldDefinition};
pub use value::FieldValue;
