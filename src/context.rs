//! Per-call execution context.
//!
//! All mutable state of one `import()` call lives here: the symbol table,
//! the warning buffer, the summary buffer, and the created-entity list.
//! The context is threaded explicitly through planner and executor calls;
//! nothing in the crate holds process-wide mutable state.

use std::collections::HashMap;

use crate::diagnostics::Warning;
use crate::storage::EntityRef;

/// Prefix applied to summary lines recorded in preview mode.
pub const PREVIEW_TAG: &str = "[preview] ";

/// A created (or previewed) entity, in creation order.
#[derive(Clone, Debug)]
pub struct CreatedRecord {
    pub symbolic_id: String,
    pub entity_ref: EntityRef,
    /// `kind.bundle` of the created entity.
    pub entity_type: String,
}

/// Mutable state for one import call.
#[derive(Debug)]
pub struct ImportContext {
    pub preview: bool,
    symbols: HashMap<String, EntityRef>,
    pub warnings: Vec<Warning>,
    pub summary: Vec<String>,
    pub created: Vec<CreatedRecord>,
}

impl ImportContext {
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            symbols: HashMap::new(),
            warnings: Vec::new(),
            summary: Vec::new(),
            created: Vec::new(),
        }
    }

    /// Bind a symbolic id to an entity ref (pass 1).
    pub fn bind(&mut self, symbolic_id: &str, entity_ref: EntityRef) {
        self.symbols.insert(symbolic_id.to_string(), entity_ref);
    }

    /// Resolve a symbolic id (pass 2).
    pub fn resolve(&self, symbolic_id: &str) -> Option<&EntityRef> {
        self.symbols.get(symbolic_id)
    }

    /// Record a non-fatal condition.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(code = ?warning.code, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Record a summary line, tagged in preview mode.
    pub fn record(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(preview = self.preview, "{}", line);
        if self.preview {
            self.summary.push(format!("{}{}", PREVIEW_TAG, line));
        } else {
            self.summary.push(line);
        }
    }

    /// Record a created entity for the result's `createdEntities` list.
    pub fn record_created(&mut self, symbolic_id: &str, entity_ref: EntityRef, entity_type: String) {
        self.created.push(CreatedRecord {
            symbolic_id: symbolic_id.to_string(),
            entity_ref,
            entity_type,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
