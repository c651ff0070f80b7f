//! `health_check` — a best-effort status snapshot of storage
//! connectivity, the advisory state cache, and active session count.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scribe_reminders::engine::ReminderCandidate;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Status of a single component check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// The component responded as expected.
    Healthy,
    /// The component is reachable but degraded.
    Degraded,
    /// The component failed to respond.
    Unhealthy,
}

/// One component's check result.
#[derive(Debug, Serialize)]
pub struct ComponentReport {
    /// Outcome of this component's check.
    pub status: ComponentStatus,
    /// Human-readable detail.
    pub message: String,
}

/// Response payload for `health_check`.
#[derive(Debug, Serialize)]
pub struct HealthCheckResult {
    /// Overall status, the worst of every component's status.
    pub status: ComponentStatus,
    /// When this check ran.
    pub timestamp: DateTime<Utc>,
    /// Per-component reports.
    pub components: BTreeMap<String, ComponentReport>,
    /// Free-form numeric metrics.
    pub metrics: BTreeMap<String, i64>,
    /// Human-readable issues surfaced by any degraded/unhealthy component.
    pub issues: Vec<String>,
}

/// Run every health check and fold the results into an overall status.
///
/// Never returns an error: a failing component is reported as
/// `unhealthy` in its own entry rather than aborting the whole check.
pub async fn run(
    ctx: &ToolContext,
) -> ToolResult<(HealthCheckResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let mut components = BTreeMap::new();
    let mut metrics = BTreeMap::new();
    let mut issues = Vec::new();
    let mut overall = ComponentStatus::Healthy;

    match ctx.db.client().query("SELECT 1").await {
        Ok(_) => {
            components.insert(
                "storage".to_string(),
                ComponentReport {
                    status: ComponentStatus::Healthy,
                    message: "storage backend is responding".to_string(),
                },
            );
        },
        Err(e) => {
            overall = ComponentStatus::Unhealthy;
            issues.push(format!("storage backend failure: {e}"));
            components.insert(
                "storage".to_string(),
                ComponentReport {
                    status: ComponentStatus::Unhealthy,
                    message: e.to_string(),
                },
            );
        },
    }

    let snapshot = ctx.state.snapshot();
    components.insert(
        "state_manager".to_string(),
        ComponentReport {
            status: ComponentStatus::Healthy,
            message: "advisory state cache is accessible".to_string(),
        },
    );
    metrics.insert(
        "recent_tools_tracked".to_string(),
        snapshot.recent_tools.len() as i64,
    );
    metrics.insert(
        "state_version".to_string(),
        i64::try_from(snapshot.version).unwrap_or(i64::MAX),
    );

    match ctx.sessions.cleanup_expired_sessions().await {
        Ok(expired) => {
            metrics.insert("sessions_expired_this_check".to_string(), expired as i64);
            components.insert(
                "sessions".to_string(),
                ComponentReport {
                    status: ComponentStatus::Healthy,
                    message: format!("expired {expired} stale session(s) during this check"),
                },
            );
        },
        Err(e) => {
            overall = ComponentStatus::Degraded.max(overall);
            issues.push(format!("session cleanup failure: {e}"));
            components.insert(
                "sessions".to_string(),
                ComponentReport {
                    status: ComponentStatus::Degraded,
                    message: e.to_string(),
                },
            );
        },
    }

    Ok((
        HealthCheckResult {
            status: overall,
            timestamp: Utc::now(),
            components,
            metrics,
            issues,
        },
        Vec::new(),
        Vec::new(),
    ))
}

impl ComponentStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unhealthy => 2,
        }
    }

    fn max(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }
}
