//! `SurrealQL` schema definition and idempotent setup.
//!
//! Migration policy is additive-only: `setup` re-runs `DEFINE ... OVERWRITE`
//! statements on every startup, which is a no-op against an unchanged
//! schema and safely widens an older one. There is no destructive path.

use crate::db::Database;
use crate::error::StorageResult;

const SCHEMA: &str = r"
DEFINE TABLE OVERWRITE scribe_projects SCHEMAFULL;
DEFINE FIELD OVERWRITE name ON scribe_projects TYPE string;
DEFINE FIELD OVERWRITE repo_root ON scribe_projects TYPE string;
DEFINE FIELD OVERWRITE progress_log_path ON scribe_projects TYPE string;
DEFINE FIELD OVERWRITE status ON scribe_projects TYPE string;
DEFINE FIELD OVERWRITE created_at ON scribe_projects TYPE datetime;
DEFINE FIELD OVERWRITE updated_at ON scribe_projects TYPE datetime;
DEFINE FIELD OVERWRITE last_entry_at ON scribe_projects TYPE option<datetime>;
DEFINE FIELD OVERWRITE last_access_at ON scribe_projects TYPE option<datetime>;
DEFINE FIELD OVERWRITE last_status_change ON scribe_projects TYPE option<datetime>;
DEFINE FIELD OVERWRITE description ON scribe_projects TYPE option<string>;
DEFINE FIELD OVERWRITE tags ON scribe_projects TYPE array<string>;
DEFINE FIELD OVERWRITE doc_hashes ON scribe_projects TYPE object;
DEFINE FIELD OVERWRITE meta ON scribe_projects TYPE object;
DEFINE INDEX OVERWRITE scribe_projects_name ON scribe_projects FIELDS name UNIQUE;

DEFINE TABLE OVERWRITE scribe_entries SCHEMAFULL;
DEFINE FIELD OVERWRITE entry_id ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE project ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE ts ON scribe_entries TYPE datetime;
DEFINE FIELD OVERWRITE emoji ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE agent ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE message ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE meta ON scribe_entries TYPE object;
DEFINE FIELD OVERWRITE raw_line ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE sha256 ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE priority ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE category ON scribe_entries TYPE string;
DEFINE FIELD OVERWRITE tags ON scribe_entries TYPE array<string>;
DEFINE FIELD OVERWRITE confidence ON scribe_entries TYPE float;
DEFINE INDEX OVERWRITE scribe_entries_entry_id ON scribe_entries FIELDS entry_id UNIQUE;
DEFINE INDEX OVERWRITE scribe_entries_priority_ts ON scribe_entries FIELDS priority, ts;
DEFINE INDEX OVERWRITE scribe_entries_category_ts ON scribe_entries FIELDS category, ts;
DEFINE INDEX OVERWRITE scribe_entries_project_priority_category ON scribe_entries FIELDS project, priority, category;

DEFINE TABLE OVERWRITE scribe_metrics SCHEMAFULL;
DEFINE FIELD OVERWRITE project ON scribe_metrics TYPE string;
DEFINE FIELD OVERWRITE total_entries ON scribe_metrics TYPE int;
DEFINE FIELD OVERWRITE success_count ON scribe_metrics TYPE int;
DEFINE FIELD OVERWRITE warn_count ON scribe_metrics TYPE int;
DEFINE FIELD OVERWRITE error_count ON scribe_metrics TYPE int;
DEFINE FIELD OVERWRITE last_update ON scribe_metrics TYPE option<datetime>;
DEFINE INDEX OVERWRITE scribe_metrics_project ON scribe_metrics FIELDS project UNIQUE;

DEFINE TABLE OVERWRITE scribe_sessions SCHEMAFULL;
DEFINE FIELD OVERWRITE session_id ON scribe_sessions TYPE string;
DEFINE FIELD OVERWRITE transport_session_id ON scribe_sessions TYPE string;
DEFINE FIELD OVERWRITE agent_kind ON scribe_sessions TYPE string;
DEFINE FIELD OVERWRITE instance_id ON scribe_sessions TYPE string;
DEFINE FIELD OVERWRITE started_at ON scribe_sessions TYPE datetime;
DEFINE FIELD OVERWRITE last_active_at ON scribe_sessions TYPE datetime;
DEFINE FIELD OVERWRITE status ON scribe_sessions TYPE string;
DEFINE INDEX OVERWRITE scribe_sessions_session_id ON scribe_sessions FIELDS session_id UNIQUE;
DEFINE INDEX OVERWRITE scribe_sessions_transport ON scribe_sessions FIELDS transport_session_id UNIQUE;

DEFINE TABLE OVERWRITE agent_projects SCHEMAFULL;
DEFINE FIELD OVERWRITE agent_id ON agent_projects TYPE string;
DEFINE FIELD OVERWRITE project_name ON agent_projects TYPE option<string>;
DEFINE FIELD OVERWRITE version ON agent_projects TYPE int;
DEFINE FIELD OVERWRITE updated_at ON agent_projects TYPE datetime;
DEFINE FIELD OVERWRITE updated_by ON agent_projects TYPE string;
DEFINE FIELD OVERWRITE session_id ON agent_projects TYPE string;
DEFINE INDEX OVERWRITE agent_projects_agent_id ON agent_projects FIELDS agent_id UNIQUE;

DEFINE TABLE OVERWRITE agent_events SCHEMAFULL;
DEFINE FIELD OVERWRITE event_type ON agent_events TYPE string;
DEFINE FIELD OVERWRITE agent_id ON agent_events TYPE string;
DEFINE FIELD OVERWRITE from_project ON agent_events TYPE option<string>;
DEFINE FIELD OVERWRITE to_project ON agent_events TYPE option<string>;
DEFINE FIELD OVERWRITE version_info ON agent_events TYPE object;
DEFINE FIELD OVERWRITE success ON agent_events TYPE bool;
DEFINE FIELD OVERWRITE context ON agent_events TYPE object;
DEFINE FIELD OVERWRITE created_at ON agent_events TYPE datetime;
DEFINE INDEX OVERWRITE agent_events_agent_created ON agent_events FIELDS agent_id, created_at;

DEFINE TABLE OVERWRITE doc_changes SCHEMAFULL;
DEFINE FIELD OVERWRITE project ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE doc_name ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE section ON doc_changes TYPE option<string>;
DEFINE FIELD OVERWRITE action ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE agent ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE sha_before ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE sha_after ON doc_changes TYPE string;
DEFINE FIELD OVERWRITE metadata ON doc_changes TYPE object;
DEFINE FIELD OVERWRITE created_at ON doc_changes TYPE datetime;
DEFINE INDEX OVERWRITE doc_changes_project_created ON doc_changes FIELDS project, created_at;

DEFINE TABLE OVERWRITE reminder_history SCHEMAFULL;
DEFINE FIELD OVERWRITE session_id ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE reminder_hash ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE project_root ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE agent_id ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE tool_name ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE reminder_key ON reminder_history TYPE string;
DEFINE FIELD OVERWRITE shown_at ON reminder_history TYPE datetime;
DEFINE FIELD OVERWRITE operation_status ON reminder_history TYPE string
    ASSERT $value IN ['success', 'failure', 'neutral'];
DEFINE FIELD OVERWRITE context_metadata ON reminder_history TYPE object;
DEFINE INDEX OVERWRITE reminder_history_session_hash ON reminder_history FIELDS session_id, reminder_hash;
DEFINE INDEX OVERWRITE reminder_history_shown_at ON reminder_history FIELDS shown_at;
DEFINE INDEX OVERWRITE reminder_history_session_tool ON reminder_history FIELDS session_id, tool_name;

DEFINE TABLE OVERWRITE sentinel_cases SCHEMAFULL;
DEFINE FIELD OVERWRITE case_id ON sentinel_cases TYPE string;
DEFINE FIELD OVERWRITE kind ON sentinel_cases TYPE string ASSERT $value IN ['bug', 'security'];
DEFINE FIELD OVERWRITE day ON sentinel_cases TYPE string;
DEFINE FIELD OVERWRITE seq ON sentinel_cases TYPE int;
DEFINE FIELD OVERWRITE title ON sentinel_cases TYPE string;
DEFINE FIELD OVERWRITE symptoms ON sentinel_cases TYPE string;
DEFINE FIELD OVERWRITE affected_paths ON sentinel_cases TYPE array<string>;
DEFINE FIELD OVERWRITE landing_status ON sentinel_cases TYPE string;
DEFINE FIELD OVERWRITE fix_links ON sentinel_cases TYPE array<object>;
DEFINE FIELD OVERWRITE created_at ON sentinel_cases TYPE datetime;
DEFINE FIELD OVERWRITE updated_at ON sentinel_cases TYPE datetime;
DEFINE INDEX OVERWRITE sentinel_cases_case_id ON sentinel_cases FIELDS case_id UNIQUE;

DEFINE TABLE OVERWRITE sentinel_case_counters SCHEMAFULL;
DEFINE FIELD OVERWRITE kind ON sentinel_case_counters TYPE string ASSERT $value IN ['bug', 'security'];
DEFINE FIELD OVERWRITE day ON sentinel_case_counters TYPE string;
DEFINE FIELD OVERWRITE count ON sentinel_case_counters TYPE int;
DEFINE INDEX OVERWRITE sentinel_case_counters_kind_day ON sentinel_case_counters FIELDS kind, day UNIQUE;
";

/// Apply the schema. Safe to call on every process startup: every
/// statement uses `OVERWRITE`, so re-running against an unchanged schema
/// is a no-op and re-running against an older one only ever widens it.
///
/// # Errors
///
/// Returns [`crate::StorageError`] if any statement fails.
pub async fn setup(db: &Database) -> StorageResult<()> {
    db.client().query(SCHEMA).await?.check()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setup_is_idempotent() {
        let db = Database::connect_memory().await.unwrap();
        setup(&db).await.unwrap();
        setup(&db).await.unwrap();
    }
}
