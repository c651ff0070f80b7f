//! `generate_doc_templates` — scaffold the standard document set for a
//! new project: a dev plan, and the three auxiliary log mirrors.

use std::path::{Path, PathBuf};

use scribe_docs::engine::{DocEngine, DocOperation, DocTarget};
use scribe_reminders::engine::ReminderCandidate;
use scribe_sandbox::Operation;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// One document the standard scaffold creates.
struct TemplateSpec {
    doc_name: &'static str,
    file_name: &'static str,
    body: fn(project: &str) -> String,
}

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec {
        doc_name: "dev_plan",
        file_name: "DEV_PLAN.md",
        body: |project| format!("# {project} — Development Plan\n\n## Phases\n\n- [ ] Phase 1\n"),
    },
    TemplateSpec {
        doc_name: "doc_log",
        file_name: "DOC_LOG.md",
        body: |project| format!("# {project} — Documentation Log\n"),
    },
    TemplateSpec {
        doc_name: "security_log",
        file_name: "SECURITY_LOG.md",
        body: |project| format!("# {project} — Security Log\n"),
    },
    TemplateSpec {
        doc_name: "bug_log",
        file_name: "BUG_LOG.md",
        body: |project| format!("# {project} — Bug Log\n"),
    },
];

/// A single scaffolded document's outcome.
#[derive(Debug, Serialize)]
pub struct GeneratedDoc {
    /// Well-known document name.
    pub doc_name: String,
    /// Path the document was written to, relative to the docs directory.
    pub path: PathBuf,
    /// `true` if the document already existed and was left untouched.
    pub skipped_existing: bool,
}

/// Response payload for `generate_doc_templates`.
#[derive(Debug, Serialize)]
pub struct GenerateDocTemplatesResult {
    /// Every document the scaffold considered, in definition order.
    pub documents: Vec<GeneratedDoc>,
}

/// Create the standard document set under `docs_dir` for `project`,
/// skipping any document that already exists.
///
/// # Errors
///
/// Returns [`crate::ToolError::PermissionDenied`] if `allow_generate_docs`
/// is `false` for this repository, or the mapped
/// [`crate::ToolError::Doc`] variant if a write fails.
pub async fn run(
    ctx: &ToolContext,
    docs_dir: &Path,
    project: &str,
    agent: &str,
) -> ToolResult<(GenerateDocTemplatesResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    ctx.permissions.check(Operation::GenerateDocs)?;

    let engine = DocEngine::new(
        std::sync::Arc::clone(&ctx.db),
        (*ctx.sandbox).clone(),
        ctx.permissions.clone(),
    );

    let mut documents = Vec::with_capacity(TEMPLATES.len());
    for spec in TEMPLATES {
        let path = docs_dir.join(spec.file_name);
        if path.exists() {
            documents.push(GeneratedDoc {
                doc_name: spec.doc_name.to_string(),
                path,
                skipped_existing: true,
            });
            continue;
        }

        let target = DocTarget {
            project: project.to_string(),
            doc_name: spec.doc_name.to_string(),
            section: None,
            agent: agent.to_string(),
        };
        engine
            .mutate(
                &path,
                DocOperation::CreateDoc {
                    content: (spec.body)(project),
                },
                target,
                false,
                &[],
            )
            .await?;
        documents.push(GeneratedDoc {
            doc_name: spec.doc_name.to_string(),
            path,
            skipped_existing: false,
        });
    }

    Ok((
        GenerateDocTemplatesResult { documents },
        Vec::new(),
        Vec::new(),
    ))
}
