//! `manage_docs` — the single entry point for every structured document
//! mutation, dispatching to [`DocEngine::mutate`].

use std::path::Path;

use scribe_docs::engine::{DocEngine, DocOperation, DocTarget, EnrichmentHook, MutationOutcome};
use scribe_reminders::catalog::TOC_STALE;
use scribe_reminders::engine::ReminderCandidate;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Response payload for `manage_docs`.
#[derive(Debug, Serialize)]
pub struct ManageDocsResult {
    /// SHA-256 of the content before the edit.
    pub sha_before: String,
    /// SHA-256 of the content after the edit.
    pub sha_after: String,
    /// Unified diff between before and after.
    pub diff_preview: String,
    /// Whether this call was a dry run (no write performed).
    pub dry_run: bool,
    /// Enrichment hooks that failed, as human-readable messages.
    pub warnings: Vec<String>,
}

impl From<MutationOutcome> for ManageDocsResult {
    fn from(outcome: MutationOutcome) -> Self {
        Self {
            sha_before: outcome.sha_before,
            sha_after: outcome.sha_after,
            diff_preview: outcome.diff_preview,
            dry_run: outcome.dry_run,
            warnings: outcome.warnings,
        }
    }
}

/// Apply `operation` to the document at `path`, recording the mutation
/// against `target`.
///
/// # Errors
///
/// Returns the mapped [`crate::ToolError::Doc`] variant if the sandbox
/// rejects the path, the operation's own preconditions fail, the write
/// cannot be verified, or the storage layer reports a failure.
pub async fn run(
    ctx: &ToolContext,
    path: &Path,
    operation: DocOperation,
    target: DocTarget,
    dry_run: bool,
    enrichment: &[&EnrichmentHook],
) -> ToolResult<(ManageDocsResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let engine = DocEngine::new(
        std::sync::Arc::clone(&ctx.db),
        (*ctx.sandbox).clone(),
        ctx.permissions.clone(),
    );
    let generates_toc = matches!(operation, DocOperation::GenerateToc);
    let outcome = engine.mutate(path, operation, target, dry_run, enrichment).await?;

    let mut candidates = Vec::new();
    if !generates_toc && !dry_run {
        candidates.push(ReminderCandidate {
            definition: TOC_STALE,
            message: "headings changed; consider regenerating the table of contents".to_string(),
        });
    }

    Ok((outcome.into(), Vec::new(), candidates))
}
