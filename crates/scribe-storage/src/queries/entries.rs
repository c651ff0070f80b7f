//! Queries against `scribe_entries`.

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::LogEntry;

/// Insert a log entry. Idempotent under retries: since `entry_id` is
/// deterministic (see `scribe-logging`), a `CREATE` that collides with an
/// existing `entry_id` is treated as a successful no-op rather than an
/// error, matching the `ON CONFLICT DO NOTHING` replay contract.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on any failure other than a duplicate
/// `entry_id`.
pub async fn insert(db: &Database, entry: &LogEntry) -> StorageResult<()> {
    if get_by_id(db, &entry.entry_id).await?.is_some() {
        return Ok(());
    }
    db.client()
        .query("CREATE scribe_entries CONTENT $entry")
        .bind(("entry", entry.clone()))
        .await?
        .check()?;
    Ok(())
}

/// Fetch a single entry by its deterministic ID.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn get_by_id(db: &Database, entry_id: &str) -> StorageResult<Option<LogEntry>> {
    let mut response = db
        .client()
        .query("SELECT * FROM scribe_entries WHERE entry_id = $entry_id LIMIT 1")
        .bind(("entry_id", entry_id.to_string()))
        .await?
        .check()?;
    let rows: Vec<LogEntry> = response.take(0)?;
    Ok(rows.into_iter().next())
}

/// Fetch the most recent `limit` entries for a project, newest first.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn recent(db: &Database, project: &str, limit: usize) -> StorageResult<Vec<LogEntry>> {
    let mut response = db
        .client()
        .query("SELECT * FROM scribe_entries WHERE project = $project ORDER BY ts DESC LIMIT $limit")
        .bind(("project", project.to_string()))
        .bind(("limit", limit as i64))
        .await?
        .check()?;
    Ok(response.take(0)?)
}

/// Time-ranged, optionally priority/category-filtered entry search.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Restrict to entries at or after this timestamp.
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    /// Restrict to entries at or before this timestamp.
    pub until: Option<chrono::DateTime<chrono::Utc>>,
    /// Restrict to a single priority.
    pub priority: Option<crate::models::Priority>,
    /// Restrict to a single category.
    pub category: Option<String>,
    /// Minimum confidence, inclusive.
    pub min_confidence: Option<f64>,
    /// Maximum rows to return.
    pub limit: usize,
}

/// Run a predicated search against `scribe_entries` for `project`.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn query(
    db: &Database,
    project: &str,
    filter: &EntryQuery,
) -> StorageResult<Vec<LogEntry>> {
    let mut clauses = vec!["project = $project".to_string()];
    if filter.since.is_some() {
        clauses.push("ts >= $since".to_string());
    }
    if filter.until.is_some() {
        clauses.push("ts <= $until".to_string());
    }
    if filter.priority.is_some() {
        clauses.push("priority = $priority".to_string());
    }
    if filter.category.is_some() {
        clauses.push("category = $category".to_string());
    }
    if filter.min_confidence.is_some() {
        clauses.push("confidence >= $min_confidence".to_string());
    }
    let sql = format!(
        "SELECT * FROM scribe_entries WHERE {} ORDER BY ts DESC LIMIT $limit",
        clauses.join(" AND ")
    );

    let mut q = db.client().query(sql).bind(("project", project.to_string()));
    if let Some(since) = filter.since {
        q = q.bind(("since", since));
    }
    if let Some(until) = filter.until {
        q = q.bind(("until", until));
    }
    if let Some(priority) = filter.priority {
        q = q.bind(("priority", priority));
    }
    if let Some(category) = filter.category.clone() {
        q = q.bind(("category", category));
    }
    if let Some(min_confidence) = filter.min_confidence {
        q = q.bind(("min_confidence", min_confidence));
    }
    q = q.bind(("limit", filter.limit as i64));

    let mut response = q.await?.check()?;
    Ok(response.take(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Utc;
    use std::collections::HashMap;

    fn sample(id: &str, project: &str) -> LogEntry {
        LogEntry {
            entry_id: id.to_string(),
            project: project.to_string(),
            ts: Utc::now(),
            emoji: "\u{2139}\u{fe0f}".to_string(),
            agent: "codex".to_string(),
            message: "did a thing".to_string(),
            meta: HashMap::new(),
            raw_line: "[\u{2139}\u{fe0f}] did a thing".to_string(),
            sha256: "deadbeef".to_string(),
            priority: Priority::Medium,
            category: "implementation".to_string(),
            tags: Vec::new(),
            confidence: 1.0,
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_duplicate_id() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let entry = sample("abc123", "demo");
        insert(&db, &entry).await.unwrap();
        insert(&db, &entry).await.unwrap();
        let rows = recent(&db, "demo", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        insert(&db, &sample("e1", "demo")).await.unwrap();
        insert(&db, &sample("e2", "demo")).await.unwrap();
        let rows = recent(&db, "demo", 10).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
