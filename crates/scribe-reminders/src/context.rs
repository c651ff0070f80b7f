//! Context assembled before reminder selection runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scribe_storage::models::OperationStatus;

/// Everything the selector and templates need for one tool invocation.
#[derive(Debug, Clone)]
pub struct ReminderContext {
    /// Tool that was invoked.
    pub tool_name: String,
    /// Active project name, if any.
    pub project_name: Option<String>,
    /// Repository root, used as part of the cooldown cache key.
    pub project_root: String,
    /// Calling agent's stable identity hash.
    pub agent_id: String,
    /// Durable session identifier, when session-aware hashing is enabled.
    pub session_id: Option<String>,
    /// Total progress-log entries recorded so far for the project.
    pub total_entries: u64,
    /// Minutes since the last progress-log entry, if any exist.
    pub minutes_since_log: Option<f64>,
    /// Timestamp of the last progress-log entry.
    pub last_log_time: Option<DateTime<Utc>>,
    /// Per-document status: name → missing/incomplete/complete.
    pub docs_status: BTreeMap<String, String>,
    /// Documents changed since the last check.
    pub docs_changed: Vec<String>,
    /// Current phase, parsed from the phase plan, if any.
    pub current_phase: Option<String>,
    /// Minutes since the session's `session_started_at`.
    pub session_age_minutes: Option<f64>,
    /// Outcome of the tool call this context was built for.
    pub operation_status: OperationStatus,
    /// Free-form extra variables for template rendering.
    pub variables: BTreeMap<String, String>,
}

impl ReminderContext {
    /// Render the fixed time variables every template receives:
    /// `now_utc`, `now_iso_utc`, `date_utc`, `time_utc`.
    #[must_use]
    pub fn time_variables(now: DateTime<Utc>) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("now_utc".to_string(), now.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        vars.insert("now_iso_utc".to_string(), now.to_rfc3339());
        vars.insert("date_utc".to_string(), now.format("%Y-%m-%d").to_string());
        vars.insert("time_utc".to_string(), now.format("%H:%M:%S").to_string());
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_variables_include_all_four_keys() {
        let now = Utc::now();
        let vars = ReminderContext::time_variables(now);
        for key in ["now_utc", "now_iso_utc", "date_utc", "time_utc"] {
            assert!(vars.contains_key(key));
        }
    }
}
