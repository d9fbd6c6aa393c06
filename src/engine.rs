//! Import engine: validation → schema stage → content passes → result.
//!
//! The three stages run strictly in sequence because each depends on the
//! previous one's output: bundle before field, field before value coercion,
//! entity existence before reference substitution. The engine is
//! synchronous and takes no locks; serializing concurrent calls that touch
//! overlapping bundles is the caller's (or the storage collaborator's) job.

use serde_json::Value as JsonValue;

use crate::content::run_content_passes;
use crate::context::ImportContext;
use crate::diagnostics::storage_failure;
use crate::document::parse_document;
use crate::plan::{ImportPlan, SchemaOp};
use crate::report::ImportResult;
use crate::schema::{body_field, plan_schema};
use crate::storage::ContentStorage;

/// The content-model import engine.
///
/// Owns its storage collaborator for the lifetime of the engine; a fresh
/// plan, symbol table, and warning buffer are built per call.
pub struct ImportEngine<S: ContentStorage> {
    storage: S,
}

impl<S: ContentStorage> ImportEngine<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Import a declarative document.
    ///
    /// With `preview` set, the identical plan is computed and summarized
    /// (lines tagged `[preview] `) but no storage mutation occurs and
    /// created entities carry placeholder refs.
    pub fn import(&mut self, document: &JsonValue, preview: bool) -> ImportResult {
        let document = match parse_document(document) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(error = %err, "document rejected");
                return ImportResult::validation_failure(&err);
            }
        };

        let mut ctx = ImportContext::new(preview);
        let mut plan = ImportPlan::default();

        // Stage 1: schema planning and execution.
        let schema_plan = plan_schema(&document.model, &self.storage, &mut ctx);
        for op in &schema_plan.ops {
            self.execute_schema_op(op, &mut ctx);
        }
        plan.schema_ops = schema_plan.ops;
        let mut effective = schema_plan.effective;

        // Stages 2 and 3: content passes.
        run_content_passes(
            &document.content,
            &mut effective,
            &mut self.storage,
            &mut ctx,
            &mut plan,
        );

        tracing::info!(
            operations = plan.op_count(),
            warnings = ctx.warnings.len(),
            preview,
            "import finished"
        );
        ImportResult::from_context(ctx)
    }

    fn execute_schema_op(&mut self, op: &SchemaOp, ctx: &mut ImportContext) {
        let description = op.describe();
        if ctx.preview {
            ctx.record(description);
            return;
        }

        let outcome = match op {
            SchemaOp::CreateBundle {
                kind,
                bundle,
                label,
                description,
            } => self
                .storage
                .create_bundle(*kind, bundle, label, description.as_deref()),
            SchemaOp::SetBundleInfo {
                kind,
                bundle,
                label,
                description,
            } => self
                .storage
                .set_bundle_info(*kind, bundle, label, description.as_deref()),
            SchemaOp::CreateField { kind, bundle, field } => {
                self.storage.create_field(*kind, bundle, field)
            }
            SchemaOp::AttachBody { kind, bundle } => {
                self.storage.create_field(*kind, bundle, &body_field())
            }
        };

        match outcome {
            Ok(()) => ctx.record(description),
            Err(err) => ctx.warn(storage_failure(&description, &err)),
        }
    }
}
