//! Document-mutation transactional contract: sandbox-checked path,
//! before/after hashing, diff preview, dry-run short-circuit, atomic
//! write with re-read verification, a `DocumentChange` audit row, and
//! best-effort enrichment callbacks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scribe_core::hash::sha256_hex;
use scribe_sandbox::{Operation, PathSandbox, PermissionChecker};
use scribe_storage::models::DocumentChange;
use scribe_storage::{queries, Database};

use crate::diff::unified_diff;
use crate::error::{DocError, DocResult};
use crate::{frontmatter, headers, toc};

/// A single enrichment hook run after a successful write. Its failure
/// is recorded as a warning string and never fails the operation.
pub type EnrichmentHook = dyn Fn(&Path, &str) -> Result<(), String> + Send + Sync;

/// The document-mutation operation to perform.
#[derive(Debug, Clone)]
pub enum DocOperation {
    /// Replace the content of `<!-- ID: section_id -->` through the
    /// next section marker (or end of file) with `content`.
    ReplaceSection {
        /// Target section marker id.
        section_id: String,
        /// Replacement content for the section body.
        content: String,
    },
    /// Append `content` to the end of the document.
    Append {
        /// Content to append.
        content: String,
    },
    /// Apply a unified diff patch to the document.
    ApplyPatchUnified {
        /// The unified diff text.
        unified_diff: String,
    },
    /// Replace the single line matching `anchor` with `content`.
    ReplaceBlock {
        /// Substring uniquely identifying the target line.
        anchor: String,
        /// Replacement line content.
        content: String,
    },
    /// Replace an inclusive, 1-indexed line range with `content`.
    ReplaceRange {
        /// First line to replace, 1-indexed.
        start: usize,
        /// Last line to replace, 1-indexed, inclusive.
        end: usize,
        /// Replacement content.
        content: String,
    },
    /// Create a new document. Exactly one of the body sources on the
    /// call site must have resolved to `Some` before reaching the
    /// engine; the engine itself never renders templates.
    CreateDoc {
        /// Full document content.
        content: String,
    },
    /// Regenerate the TOC block in place.
    GenerateToc,
    /// Renumber and normalize headings in place.
    NormalizeHeaders,
}

/// Outcome of a document-mutation call.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
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

/// Parameters identifying the document being mutated, for the audit
/// trail row.
#[derive(Debug, Clone)]
pub struct DocTarget {
    /// Owning project slug.
    pub project: String,
    /// Well-known document name.
    pub doc_name: String,
    /// Section identifier, when applicable.
    pub section: Option<String>,
    /// Agent performing the edit.
    pub agent: String,
}

/// Runs the document-mutation transactional contract against the
/// filesystem, storage, and sandbox layers.
pub struct DocEngine {
    db: Arc<Database>,
    sandbox: PathSandbox,
    permissions: PermissionChecker,
}

impl DocEngine {
    /// Build an engine scoped to a single repository.
    #[must_use]
    pub fn new(db: Arc<Database>, sandbox: PathSandbox, permissions: PermissionChecker) -> Self {
        Self {
            db,
            sandbox,
            permissions,
        }
    }

    /// Run `operation` against `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`DocError`] if the sandbox rejects the path, the
    /// operation's own preconditions fail, the write cannot be
    /// verified, or the storage layer reports a failure.
    pub async fn mutate(
        &self,
        path: &Path,
        operation: DocOperation,
        target: DocTarget,
        dry_run: bool,
        enrichment: &[&EnrichmentHook],
    ) -> DocResult<MutationOutcome> {
        let resolved = self.sandbox.check(path)?;
        self.permissions.check(Operation::GenerateDocs)?;

        let before = std::fs::read_to_string(&resolved).unwrap_or_default();
        let sha_before = sha256_hex(before.as_bytes());

        let after = compute_new_content(&before, &operation)?;
        let sha_after = sha256_hex(after.as_bytes());
        let diff_preview = unified_diff(&target.doc_name, &before, &after);

        if dry_run {
            return Ok(MutationOutcome {
                sha_before,
                sha_after,
                diff_preview,
                dry_run: true,
                warnings: Vec::new(),
            });
        }

        scribe_fileio::atomic::atomic_write(&resolved, after.as_bytes()).await?;

        let reread = std::fs::read_to_string(&resolved).unwrap_or_default();
        if sha256_hex(reread.as_bytes()) != sha_after {
            scribe_fileio::atomic::atomic_write(&resolved, before.as_bytes()).await?;
            return Err(DocError::VerificationFailed { path: resolved });
        }

        let change = DocumentChange {
            project: target.project.clone(),
            doc_name: target.doc_name.clone(),
            section: target.section.clone(),
            action: operation_name(&operation).to_string(),
            agent: target.agent.clone(),
            sha_before: sha_before.clone(),
            sha_after: sha_after.clone(),
            metadata: std::collections::HashMap::new(),
            created_at: chrono::Utc::now(),
        };
        queries::doc_changes::insert(&self.db, &change).await?;

        let mut warnings = Vec::new();
        for hook in enrichment {
            if let Err(message) = hook(&resolved, &after) {
                warnings.push(message);
            }
        }

        Ok(MutationOutcome {
            sha_before,
            sha_after,
            diff_preview,
            dry_run: false,
            warnings,
        })
    }
}

fn operation_name(operation: &DocOperation) -> &'static str {
    match operation {
        DocOperation::ReplaceSection { .. } => "replace_section",
        DocOperation::Append { .. } => "append",
        DocOperation::ApplyPatchUnified { .. } => "apply_patch",
        DocOperation::ReplaceBlock { .. } => "replace_block",
        DocOperation::ReplaceRange { .. } => "replace_range",
        DocOperation::CreateDoc { .. } => "create_doc",
        DocOperation::GenerateToc => "generate_toc",
        DocOperation::NormalizeHeaders => "normalize_headers",
    }
}

fn compute_new_content(before: &str, operation: &DocOperation) -> DocResult<String> {
    match operation {
        DocOperation::ReplaceSection { section_id, content } => {
            replace_section(before, section_id, content)
        },
        DocOperation::Append { content } => {
            let mut out = before.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(content);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            Ok(out)
        },
        DocOperation::ApplyPatchUnified { unified_diff } => {
            crate::diff::apply_patch(before, unified_diff)
        },
        DocOperation::ReplaceBlock { anchor, content } => replace_block(before, anchor, content),
        DocOperation::ReplaceRange { start, end, content } => {
            replace_range(before, *start, *end, content)
        },
        DocOperation::CreateDoc { content } => {
            if content.is_empty() {
                return Err(DocError::CreateDocMissingContent);
            }
            Ok(content.clone())
        },
        DocOperation::GenerateToc => Ok(toc::generate_toc(before)),
        DocOperation::NormalizeHeaders => {
            Ok(headers::normalize_headers(&headers::setext_to_atx(before)))
        },
    }
}

fn replace_section(before: &str, section_id: &str, content: &str) -> DocResult<String> {
    let marker = format!("<!-- ID: {section_id} -->");
    let lines: Vec<&str> = before.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim() == marker) else {
        return Err(DocError::SectionNotFound(section_id.to_string()));
    };
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim_start().starts_with("<!-- ID: "))
        .map_or(lines.len(), |rel| start + 1 + rel);

    let mut out: Vec<String> = lines[..=start].iter().map(|l| (*l).to_string()).collect();
    out.push(content.trim_end().to_string());
    out.extend(lines[end..].iter().map(|l| (*l).to_string()));
    let mut result = out.join("\n");
    result.push('\n');
    Ok(result)
}

/// Replace the single body line matching `anchor`, skipping lines inside
/// fenced code blocks so a fence-internal occurrence never counts as a
/// match. Line numbers in [`DocError::StructuredEditAnchorAmbiguous`]
/// are 1-indexed within the body, i.e. after any front-matter block.
fn replace_block(before: &str, anchor: &str, content: &str) -> DocResult<String> {
    let fm = frontmatter::parse(before)?;
    let lines: Vec<&str> = fm.body.lines().collect();
    let mut in_fence = false;
    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            if toc::is_fence_marker(l) {
                in_fence = !in_fence;
                return false;
            }
            !in_fence && l.contains(anchor)
        })
        .map(|(i, _)| i + 1)
        .collect();
    match matches.len() {
        0 => Err(DocError::StructuredEditAnchorNotFound {
            anchor: anchor.to_string(),
        }),
        1 => {
            let idx = matches[0] - 1;
            let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
            out[idx] = content.to_string();
            let mut body = out.join("\n");
            body.push('\n');
            Ok(format!("{}{}", fm.raw, body))
        },
        _ => Err(DocError::StructuredEditAnchorAmbiguous {
            anchor: anchor.to_string(),
            matches,
        }),
    }
}

/// Replace an inclusive, 1-indexed body line range with `content`. The
/// range is relative to the body, after any front-matter block has been
/// split off.
fn replace_range(before: &str, start: usize, end: usize, content: &str) -> DocResult<String> {
    let fm = frontmatter::parse(before)?;
    let lines: Vec<&str> = fm.body.lines().collect();
    if start == 0 || start > end || end > lines.len() {
        return Err(DocError::RangeOutOfBounds {
            start,
            end,
            body_len: lines.len(),
        });
    }
    let mut out: Vec<String> = lines[..start - 1].iter().map(|l| (*l).to_string()).collect();
    out.push(content.trim_end().to_string());
    out.extend(lines[end..].iter().map(|l| (*l).to_string()));
    let mut body = out.join("\n");
    body.push('\n');
    Ok(format!("{}{}", fm.raw, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_sandbox::PermissionChecker;

    fn engine(db: Arc<Database>, root: &Path) -> DocEngine {
        DocEngine::new(db, PathSandbox::new(root), PermissionChecker::default())
    }

    fn target() -> DocTarget {
        DocTarget {
            project: "demo".to_string(),
            doc_name: "progress_log".to_string(),
            section: None,
            agent: "codex".to_string(),
        }
    }

    async fn db() -> Arc<Database> {
        let db = Database::connect_memory().await.unwrap();
        scribe_storage::schema::setup(&db).await.unwrap();
        Arc::new(db)
    }

    #[tokio::test]
    async fn append_writes_and_records_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "existing\n").unwrap();
        let db = db().await;
        let engine = engine(db.clone(), dir.path());
        let outcome = engine
            .mutate(
                &path,
                DocOperation::Append {
                    content: "new line".to_string(),
                },
                target(),
                false,
                &[],
            )
            .await
            .unwrap();
        assert!(!outcome.dry_run);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nnew line\n");
        let rows = queries::doc_changes::recent(&db, "demo", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn dry_run_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "existing\n").unwrap();
        let db = db().await;
        let engine = engine(db, dir.path());
        let outcome = engine
            .mutate(
                &path,
                DocOperation::Append {
                    content: "new line".to_string(),
                },
                target(),
                true,
                &[],
            )
            .await
            .unwrap();
        assert!(outcome.dry_run);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\n");
    }

    #[tokio::test]
    async fn replace_section_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "no markers here\n").unwrap();
        let db = db().await;
        let engine = engine(db, dir.path());
        let err = engine
            .mutate(
                &path,
                DocOperation::ReplaceSection {
                    section_id: "missing".to_string(),
                    content: "x".to_string(),
                },
                target(),
                false,
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DocError::SectionNotFound(_)));
    }

    #[tokio::test]
    async fn enrichment_failure_is_captured_as_warning_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "existing\n").unwrap();
        let db = db().await;
        let engine = engine(db, dir.path());
        let failing: &EnrichmentHook = &|_path, _content| Err("enrichment failed".to_string());
        let outcome = engine
            .mutate(
                &path,
                DocOperation::Append {
                    content: "more".to_string(),
                },
                target(),
                false,
                &[failing],
            )
            .await
            .unwrap();
        assert_eq!(outcome.warnings, vec!["enrichment failed".to_string()]);
    }

    #[test]
    fn replace_block_errors_on_ambiguous_anchor() {
        let before = "alpha\nalpha\nbeta\n";
        let err = replace_block(before, "alpha", "gamma").unwrap_err();
        assert!(matches!(
            err,
            DocError::StructuredEditAnchorAmbiguous { matches, .. } if matches == vec![1, 2]
        ));
    }

    #[test]
    fn replace_range_rejects_out_of_bounds() {
        let before = "one\ntwo\n";
        let err = replace_range(before, 1, 5, "x").unwrap_err();
        assert!(matches!(err, DocError::RangeOutOfBounds { .. }));
    }

    #[test]
    fn replace_range_indexes_body_after_frontmatter() {
        let before = "---\ntitle: demo\n---\none\ntwo\nthree\n";
        let after = replace_range(before, 2, 2, "TWO").unwrap();
        assert_eq!(after, "---\ntitle: demo\n---\none\nTWO\nthree\n");
    }

    #[test]
    fn replace_block_ignores_anchor_inside_fenced_code() {
        let before = "---\ntitle: demo\n---\n# Doc\n```\ntarget line\n```\ntarget line\n";
        let after = replace_block(before, "target line", "replaced").unwrap();
        assert!(after.contains("```\ntarget line\n```"));
        assert!(after.contains("\nreplaced\n"));
    }

    #[test]
    fn replace_block_matches_are_body_relative() {
        let before = "---\ntitle: demo\n---\nalpha\nalpha\nbeta\n";
        let err = replace_block(before, "alpha", "gamma").unwrap_err();
        assert!(matches!(
            err,
            DocError::StructuredEditAnchorAmbiguous { matches, .. } if matches == vec![1, 2]
        ));
    }
}
