//! Queries against `scribe_metrics`, a per-project rollup upserted
//! alongside every entry insert.

use chrono::Utc;

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::{Priority, ProjectMetrics};

/// Increment the rollup counters for `project` given the priority of the
/// entry that was just inserted. Creates the metrics row if absent.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn record_entry(db: &Database, project: &str, priority: Priority) -> StorageResult<()> {
    let success_delta = i64::from(priority == Priority::Low || priority == Priority::Medium);
    let warn_delta = i64::from(priority == Priority::High);
    let error_delta = i64::from(priority == Priority::Critical);

    db.client()
        .query(
            "UPDATE scribe_metrics SET \
             total_entries = (total_entries ?? 0) + 1, \
             success_count = (success_count ?? 0) + $success_delta, \
             warn_count = (warn_count ?? 0) + $warn_delta, \
             error_count = (error_count ?? 0) + $error_delta, \
             last_update = $now \
             WHERE project = $project \
             RETURNING *",
        )
        .bind(("project", project.to_string()))
        .bind(("success_delta", success_delta))
        .bind(("warn_delta", warn_delta))
        .bind(("error_delta", error_delta))
        .bind(("now", Utc::now()))
        .await?
        .check()?
        .take::<Vec<ProjectMetrics>>(0)?;

    if get(db, project).await?.is_none() {
        let row = ProjectMetrics {
            project: project.to_string(),
            total_entries: 1,
            success_count: success_delta,
            warn_count: warn_delta,
            error_count: error_delta,
            last_update: Some(Utc::now()),
        };
        db.client()
            .query("CREATE scribe_metrics CONTENT $row")
            .bind(("row", row))
            .await?
            .check()?;
    }

    Ok(())
}

/// Fetch the rollup for a project, if it has ever recorded an entry.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn get(db: &Database, project: &str) -> StorageResult<Option<ProjectMetrics>> {
    let mut response = db
        .client()
        .query("SELECT * FROM scribe_metrics WHERE project = $project LIMIT 1")
        .bind(("project", project.to_string()))
        .await?
        .check()?;
    let rows: Vec<ProjectMetrics> = response.take(0)?;
    Ok(rows.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_entry_creates_row_on_first_call() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        record_entry(&db, "demo", Priority::High).await.unwrap();

        let metrics = get(&db, "demo").await.unwrap().unwrap();
        assert_eq!(metrics.total_entries, 1);
        assert_eq!(metrics.warn_count, 1);
        assert_eq!(metrics.success_count, 0);
    }

    #[tokio::test]
    async fn record_entry_accumulates_across_calls() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        record_entry(&db, "demo", Priority::Low).await.unwrap();
        record_entry(&db, "demo", Priority::Critical).await.unwrap();

        let metrics = get(&db, "demo").await.unwrap().unwrap();
        assert_eq!(metrics.total_entries, 2);
        assert_eq!(metrics.success_count, 1);
        assert_eq!(metrics.error_count, 1);
    }
}
