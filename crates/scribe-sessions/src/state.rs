//! The advisory JSON state file: a cache hint that survives process
//! restarts, with the database remaining authoritative for
//! [`scribe_storage::models::AgentProject`] and
//! [`scribe_storage::models::AgentSession`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Recent-tools ring buffer capacity.
pub const RECENT_TOOLS_CAPACITY: usize = 10;

/// Recently-bounded projects list capacity.
pub const RECENT_PROJECTS_CAPACITY: usize = 10;

/// A snapshot of a project as last observed, used to make `get_project`'s
/// "recently accessed" hint cheap without a query.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectSnapshot {
    /// Project name.
    pub name: String,
    /// Last time this project was touched, ISO-8601 UTC.
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// One entry in the recent-tools ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentToolCall {
    /// Tool name.
    pub name: String,
    /// When it was invoked.
    pub ts: DateTime<Utc>,
}

/// Free-form agent activity bookkeeping, carried verbatim in the state
/// file for diagnostic tooling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentState {
    /// Arbitrary activity log lines.
    pub activity_log: Vec<String>,
    /// The agent_id of the most recent mutation.
    pub last_agent_id: Option<String>,
}

/// The JSON-file-resident advisory state described in the data model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    /// Name of the currently selected project, process-wide hint.
    pub current_project: Option<String>,
    /// Name to last-known project snapshot.
    pub projects: HashMap<String, ProjectSnapshot>,
    /// Ordered, bounded list of recently accessed project names.
    pub recent_projects: Vec<String>,
    /// Session ID to last-known project snapshot, a cache hint only.
    pub session_projects: HashMap<String, ProjectSnapshot>,
    /// Bounded, deduplicated-by-name ring buffer of recent tool calls.
    pub recent_tools: Vec<RecentToolCall>,
    /// Last time any tool call was recorded.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// When the current session window started, reset after an idle gap.
    pub session_started_at: Option<DateTime<Utc>>,
    /// Monotonically increasing; bumped on every `set_current_project`.
    pub version: u64,
    /// Identifier of whoever performed the last mutation.
    pub last_updated_by: Option<String>,
    /// Timestamp of the last mutation.
    pub operation_timestamp: Option<DateTime<Utc>>,
    /// Free-form agent activity bookkeeping.
    pub agent_state: AgentState,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            current_project: None,
            projects: HashMap::new(),
            recent_projects: Vec::new(),
            session_projects: HashMap::new(),
            recent_tools: Vec::new(),
            last_activity_at: None,
            session_started_at: None,
            version: 0,
            last_updated_by: None,
            operation_timestamp: None,
            agent_state: AgentState::default(),
        }
    }
}

/// Guards [`PersistedState`] with an in-process lock and persists it via
/// temp-file-plus-rename, per the shared-resources model: "State file:
/// protected by an in-process mutex and written via temp+rename."
pub struct StateManager {
    path: PathBuf,
    state: RwLock<PersistedState>,
}

impl StateManager {
    /// Load state from `path` if it exists and parses; otherwise start
    /// from [`PersistedState::default`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let state = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                PersistedState::default()
            },
            Err(source) => {
                return Err(SessionError::Storage(
                    scribe_storage::StorageError::Internal(source.to_string()),
                ));
            },
        };
        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(state),
        })
    }

    /// Snapshot the current state.
    #[must_use]
    pub fn snapshot(&self) -> PersistedState {
        self.state.read().expect("state lock poisoned").clone()
    }

    /// Record a tool invocation into the recent-tools ring buffer,
    /// deduplicating by name (a re-invoked tool moves to the front), and
    /// reset `session_started_at` if the idle gap since `last_activity_at`
    /// exceeds `idle_threshold_minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the write-back fails.
    pub async fn record_tool_call(
        &self,
        tool_name: &str,
        idle_threshold_minutes: i64,
    ) -> SessionResult<()> {
        let now = Utc::now();
        {
            let mut state = self.state.write().expect("state lock poisoned");
            let idle = state
                .last_activity_at
                .map(|last| now - last > chrono::Duration::minutes(idle_threshold_minutes))
                .unwrap_or(true);
            if idle || state.session_started_at.is_none() {
                state.session_started_at = Some(now);
            }
            state.recent_tools.retain(|call| call.name != tool_name);
            state.recent_tools.push(RecentToolCall {
                name: tool_name.to_string(),
                ts: now,
            });
            if state.recent_tools.len() > RECENT_TOOLS_CAPACITY {
                let overflow = state.recent_tools.len() - RECENT_TOOLS_CAPACITY;
                state.recent_tools.drain(0..overflow);
            }
            state.last_activity_at = Some(now);
        }
        self.persist().await
    }

    /// Record that `project_name` is now the current project, bumping
    /// `version` and updating the recent-projects list.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the write-back fails.
    pub async fn record_project_set(
        &self,
        project_name: &str,
        updated_by: &str,
    ) -> SessionResult<()> {
        let now = Utc::now();
        {
            let mut state = self.state.write().expect("state lock poisoned");
            state.current_project = Some(project_name.to_string());
            state.projects.insert(
                project_name.to_string(),
                ProjectSnapshot {
                    name: project_name.to_string(),
                    last_seen_at: Some(now),
                },
            );
            state.recent_projects.retain(|name| name != project_name);
            state.recent_projects.insert(0, project_name.to_string());
            state.recent_projects.truncate(RECENT_PROJECTS_CAPACITY);
            state.version += 1;
            state.last_updated_by = Some(updated_by.to_string());
            state.operation_timestamp = Some(now);
        }
        self.persist().await
    }

    async fn persist(&self) -> SessionResult<()> {
        let serialized = {
            let state = self.state.read().expect("state lock poisoned");
            serde_json::to_vec_pretty(&*state)
                .map_err(|e| SessionError::Storage(scribe_storage::StorageError::Serialization(e.to_string())))?
        };
        scribe_fileio::atomic::atomic_write(&self.path, &serialized)
            .await
            .map_err(|e| SessionError::Storage(scribe_storage::StorageError::Internal(e.to_string())))?;
        Ok(())
    }
}
