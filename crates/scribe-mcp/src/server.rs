//! The stdio MCP server: wires every `scribe-tools` tool body behind
//! `rmcp`'s macro-generated tool router.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler};
use scribe_config::repo_config::{RepoConfig, StorageBackend};
use scribe_core::context::Mode;
use scribe_docs::engine::{DocOperation, DocTarget};
use scribe_reminders::cooldown::{default_cache_path, CooldownCache};
use scribe_reminders::engine::ReminderEngine;
use scribe_sandbox::PathSandbox;
use scribe_sessions::manager::SessionManager;
use scribe_sessions::project_context::ProjectContext;
use scribe_sessions::state::StateManager;
use scribe_storage::models::{Priority, SentinelCaseKind};
use scribe_storage::Database;
use scribe_tools::tools::{
    append_entry, generate_doc_templates, get_project, health_check, list_projects, manage_docs,
    query_entries, read_recent, rotate_log, sentinel, set_project,
};
use scribe_tools::{dispatch, CallRequest, ToolContext, ToolError, ToolResponse};
use serde::Serialize;
use serde_json::Value;

use crate::error::to_error_data;
use crate::params::{
    AppendEntryParams, AppendEventParams, Common, GenerateDocTemplatesParams, GetProjectParams,
    HealthCheckParams, LinkFixParams, ListProjectsParams, ManageDocsParams, OpenCaseParams,
    QueryEntriesParams, ReadRecentParams, RotateLogParams, SetProjectParams,
};

const IDLE_THRESHOLD_MINUTES: i64 = 30;

/// The running server: holds every shared dependency a tool body needs.
#[derive(Clone)]
pub struct ScribeServer {
    ctx: ToolContext,
    project_ctx: Arc<ProjectContext>,
    config: RepoConfig,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScribeServer {
    /// Connect to storage and build every shared dependency from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured storage backend cannot be
    /// reached, the schema cannot be installed, or the advisory state
    /// cache cannot be loaded.
    pub async fn connect(repo_root: PathBuf, config: RepoConfig) -> anyhow::Result<Self> {
        let db = Arc::new(match config.storage_backend {
            StorageBackend::Embedded => {
                let path = config
                    .db_path
                    .clone()
                    .unwrap_or_else(|| config.scribe_dir().join("scribe.db"));
                Database::connect_embedded(&path.display().to_string()).await?
            },
            StorageBackend::Server => {
                let url = config.db_url.clone().ok_or_else(|| {
                    anyhow::anyhow!("storage_backend is 'server' but db_url is unset")
                })?;
                Database::connect_server(&url).await?
            },
        });
        scribe_storage::schema::setup(&db).await?;

        let sandbox = Arc::new(PathSandbox::new(repo_root.clone()));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&db)));
        let state = Arc::new(StateManager::load(&config.scribe_dir().join("state.json"))?);
        let cooldown = CooldownCache::load(default_cache_path(&config.scribe_dir()));
        let mut reminder_engine = ReminderEngine::new(Arc::clone(&db), cooldown, true);
        if let Some(max) = config
            .reminder_config
            .get("max_reminders")
            .and_then(serde_json::Value::as_u64)
        {
            reminder_engine = reminder_engine.with_max_reminders(max as usize);
        }
        let reminders = Arc::new(reminder_engine);
        let project_ctx = Arc::new(ProjectContext::new(Arc::clone(&db)));

        let ctx = ToolContext {
            db,
            sandbox,
            repo_root_display: repo_root.display().to_string(),
            permissions: config.permissions.clone(),
            sessions,
            state,
            reminders,
            idle_threshold_minutes: IDLE_THRESHOLD_MINUTES,
        };

        Ok(Self {
            ctx,
            project_ctx,
            config,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(description = "Point the calling agent's current-project pointer at a project, creating it on first use.")]
    async fn set_project(
        &self,
        params: Parameters<SetProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "set_project")?;
        let ctx = self.ctx.clone();
        let project_ctx = Arc::clone(&self.project_ctx);
        let progress_log_name = self.config.progress_log_name.clone();
        run(request, &self.ctx, move || async move {
            set_project::run(
                &ctx,
                project_ctx,
                &p.agent_id,
                &p.project_name,
                &progress_log_name,
                p.expected_version,
            )
            .await
        })
        .await
    }

    #[tool(description = "Read the calling agent's current-project pointer.")]
    async fn get_project(
        &self,
        params: Parameters<GetProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "get_project")?;
        let project_ctx = Arc::clone(&self.project_ctx);
        run(request, &self.ctx, move || async move {
            get_project::run(project_ctx, &p.agent_id, p.require_project).await
        })
        .await
    }

    #[tool(description = "Enumerate every project known in this repository, optionally filtered by status.")]
    async fn list_projects(
        &self,
        params: Parameters<ListProjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "list_projects")?;
        let status = match p.status {
            Some(raw) => Some(parse_project_status(&raw)?),
            None => None,
        };
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            list_projects::run(&ctx, status).await
        })
        .await
    }

    #[tool(description = "Append one or more structured progress-log entries, optionally teed to an auxiliary stream.")]
    async fn append_entry(
        &self,
        params: Parameters<AppendEntryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "append_entry")?;
        let ctx = self.ctx.clone();
        let log_path = self.config.progress_log_path(&p.project);
        let docs_dir = self.config.project_docs_dir(&p.project);
        let repo_slug = self.config.repo_slug.clone();
        run(request, &self.ctx, move || async move {
            append_entry::run(&ctx, &log_path, &docs_dir, &repo_slug, &p.project, p.items).await
        })
        .await
    }

    #[tool(description = "Fetch the most recent progress-log entries for a project, response-size-limited by mode.")]
    async fn read_recent(
        &self,
        params: Parameters<ReadRecentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "read_recent")?;
        let mode = p.mode.unwrap_or_else(|| "readable".to_string());
        let fetch_limit = p.fetch_limit.unwrap_or(200);
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            read_recent::run(&ctx, &p.project, &mode, fetch_limit).await
        })
        .await
    }

    #[tool(description = "Search a project's progress log by time range, priority, category, or minimum confidence.")]
    async fn query_entries(
        &self,
        params: Parameters<QueryEntriesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "query_entries")?;
        let since = match p.since {
            Some(raw) => Some(parse_timestamp(&raw)?),
            None => None,
        };
        let until = match p.until {
            Some(raw) => Some(parse_timestamp(&raw)?),
            None => None,
        };
        let priority = match p.priority {
            Some(raw) => Some(parse_priority(&raw)?),
            None => None,
        };
        let args = query_entries::QueryEntriesArgs {
            since,
            until,
            priority,
            category: p.category,
            min_confidence: p.min_confidence,
            mode: p.mode.unwrap_or_else(|| "readable".to_string()),
        };
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            query_entries::run(&ctx, &p.project, args).await
        })
        .await
    }

    #[tool(description = "Apply a single structured mutation to a project document.")]
    async fn manage_docs(
        &self,
        params: Parameters<ManageDocsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "manage_docs")?;
        let operation = parse_doc_operation(&p.operation)?;
        let path = self
            .config
            .project_docs_dir(&p.project)
            .join(format!("{}.md", p.doc_name));
        let target = DocTarget {
            project: p.project,
            doc_name: p.doc_name,
            section: p.section,
            agent: p.agent,
        };
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            manage_docs::run(&ctx, &path, operation, target, p.dry_run, &[]).await
        })
        .await
    }

    #[tool(description = "Scaffold the standard document set (dev plan, doc/security/bug log mirrors) for a project.")]
    async fn generate_doc_templates(
        &self,
        params: Parameters<GenerateDocTemplatesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "generate_doc_templates")?;
        let docs_dir = self.config.project_docs_dir(&p.project);
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            generate_doc_templates::run(&ctx, &docs_dir, &p.project, &p.agent).await
        })
        .await
    }

    #[tool(description = "Archive the live progress log, chaining the archive to its predecessor by content hash.")]
    async fn rotate_log(
        &self,
        params: Parameters<RotateLogParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "rotate_log")?;
        let log_path = self.config.progress_log_path(&p.project);
        let archive_dir = self.config.scribe_dir().join("archive").join(&p.project);
        let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            rotate_log::run(&ctx, &log_path, &archive_dir, &timestamp).await
        })
        .await
    }

    #[tool(description = "A best-effort status snapshot of storage connectivity, the advisory state cache, and sessions.")]
    async fn health_check(
        &self,
        params: Parameters<HealthCheckParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "health_check")?;
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move { health_check::run(&ctx).await }).await
    }

    #[tool(description = "Open a new sentinel-mode bug case, assigning a per-day sequence number (BUG-YYYY-MM-DD-NNNN).")]
    async fn open_bug(
        &self,
        params: Parameters<OpenCaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "open_bug")?;
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            sentinel::open_case(
                &ctx,
                SentinelCaseKind::Bug,
                &p.day,
                &p.title,
                &p.symptoms,
                p.affected_paths,
            )
            .await
        })
        .await
    }

    #[tool(description = "Open a new sentinel-mode security case, assigning a per-day sequence number (SEC-YYYY-MM-DD-NNNN).")]
    async fn open_security(
        &self,
        params: Parameters<OpenCaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "open_security")?;
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            sentinel::open_case(
                &ctx,
                SentinelCaseKind::Security,
                &p.day,
                &p.title,
                &p.symptoms,
                p.affected_paths,
            )
            .await
        })
        .await
    }

    #[tool(description = "Attach a fix artifact to an already-open sentinel case and update its lifecycle status.")]
    async fn link_fix(
        &self,
        params: Parameters<LinkFixParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "link_fix")?;
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            sentinel::link_fix(
                &ctx,
                &p.case_id,
                &p.execution_id,
                &p.artifact_ref,
                &p.landing_status,
            )
            .await
        })
        .await
    }

    #[tool(description = "Append one sentinel-mode event to the day's JSONL log and its markdown mirror.")]
    async fn append_event(
        &self,
        params: Parameters<AppendEventParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let p = params.0;
        let request = self.call_request(p.common, "append_event")?;
        let sentinel_dir = self.config.scribe_dir().join("sentinel");
        let ctx = self.ctx.clone();
        run(request, &self.ctx, move || async move {
            sentinel::append_event(&ctx, &sentinel_dir, &p.day, &p.agent, &p.event_type, p.data)
                .await
        })
        .await
    }
}

impl ScribeServer {
    fn call_request(&self, common: Common, tool_name: &str) -> Result<CallRequest, ErrorData> {
        let mode = Mode::parse(&common.mode).map_err(|e| to_error_data(&ToolError::from(e)))?;
        Ok(CallRequest {
            repo_root: PathBuf::from(common.repo_root),
            mode,
            transport_session_id: common.transport_session_id,
            agent_kind: common.agent_kind,
            agent_model: common.agent_model,
            intent: common.intent,
            affected_dev_projects: common.affected_dev_projects,
            sentinel_day: common.sentinel_day,
            tool_name: tool_name.to_string(),
        })
    }
}

#[tool_handler]
impl ServerHandler for ScribeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.mcp_server_name.clone(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Mediates structured progress-log writes, document mutation, and sentinel-mode \
                 bug/security case tracking for concurrent autonomous agents."
                    .to_string(),
            ),
        }
    }
}

fn parse_project_status(raw: &str) -> Result<scribe_storage::models::ProjectStatus, ErrorData> {
    use scribe_storage::models::ProjectStatus;
    match raw {
        "planning" => Ok(ProjectStatus::Planning),
        "in_progress" => Ok(ProjectStatus::InProgress),
        "paused" => Ok(ProjectStatus::Paused),
        "completed" => Ok(ProjectStatus::Completed),
        "archived" => Ok(ProjectStatus::Archived),
        other => Err(to_error_data(&ToolError::ParameterValidation(format!(
            "unknown project status '{other}'"
        )))),
    }
}

fn parse_priority(raw: &str) -> Result<Priority, ErrorData> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "critical" => Ok(Priority::Critical),
        other => Err(to_error_data(&ToolError::ParameterValidation(format!(
            "unknown priority '{other}'"
        )))),
    }
}

fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, ErrorData> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            to_error_data(&ToolError::ParameterValidation(format!(
                "invalid timestamp '{raw}': {e}"
            )))
        })
}

fn parse_doc_operation(value: &Value) -> Result<DocOperation, ErrorData> {
    let obj = value.as_object().ok_or_else(|| {
        to_error_data(&ToolError::ParameterValidation(
            "operation must be an object".to_string(),
        ))
    })?;
    let ty = obj.get("type").and_then(Value::as_str).ok_or_else(|| {
        to_error_data(&ToolError::ParameterValidation(
            "operation.type is required".to_string(),
        ))
    })?;
    let field = |name: &str| -> Result<String, ErrorData> {
        obj.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                to_error_data(&ToolError::ParameterValidation(format!(
                    "operation.{name} is required"
                )))
            })
    };
    let index = |name: &str| -> Result<usize, ErrorData> {
        obj.get(name)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .ok_or_else(|| {
                to_error_data(&ToolError::ParameterValidation(format!(
                    "operation.{name} is required"
                )))
            })
    };

    match ty {
        "replace_section" => Ok(DocOperation::ReplaceSection {
            section_id: field("section_id")?,
            content: field("content")?,
        }),
        "append" => Ok(DocOperation::Append {
            content: field("content")?,
        }),
        "apply_patch_unified" => Ok(DocOperation::ApplyPatchUnified {
            unified_diff: field("unified_diff")?,
        }),
        "replace_block" => Ok(DocOperation::ReplaceBlock {
            anchor: field("anchor")?,
            content: field("content")?,
        }),
        "replace_range" => Ok(DocOperation::ReplaceRange {
            start: index("start")?,
            end: index("end")?,
            content: field("content")?,
        }),
        "create_doc" => Ok(DocOperation::CreateDoc {
            content: field("content")?,
        }),
        "generate_toc" => Ok(DocOperation::GenerateToc),
        "normalize_headers" => Ok(DocOperation::NormalizeHeaders),
        other => Err(to_error_data(&ToolError::ParameterValidation(format!(
            "unknown operation type '{other}'"
        )))),
    }
}

/// Serialize a dispatched tool's response envelope into an MCP result: a
/// short text summary plus the full structured payload.
fn to_call_tool_result<T: Serialize>(
    response: ToolResponse<T>,
) -> Result<CallToolResult, ErrorData> {
    let value = serde_json::to_value(&response).map_err(|e| {
        to_error_data(&ToolError::ParameterValidation(format!(
            "response not serializable: {e}"
        )))
    })?;
    let summary = format!(
        "execution {} ({} reminder(s), {} validation warning(s))",
        response.execution_id,
        response.reminders.len(),
        response.validation_warnings.len()
    );
    Ok(CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: Some(value),
        is_error: Some(false),
        meta: None,
    })
}

async fn run<T, F, Fut>(
    request: CallRequest,
    ctx: &ToolContext,
    body: F,
) -> Result<CallToolResult, ErrorData>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<
        Output = scribe_tools::ToolResult<(
            T,
            Vec<scribe_tools::healing::HealingNote>,
            Vec<scribe_reminders::engine::ReminderCandidate>,
        )>,
    >,
{
    match dispatch(request, ctx, body).await {
        Ok(response) => to_call_tool_result(response),
        Err(err) => Err(to_error_data(&err)),
    }
}
