//! Queries against `doc_changes`, with retention trimming.

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::DocumentChange;

/// Rows kept per project before the oldest are pruned.
pub const RETENTION_PER_PROJECT: usize = 500;

/// Insert a document-change record, then prune anything past the
/// retention window for the same project.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn insert(db: &Database, change: &DocumentChange) -> StorageResult<()> {
    db.client()
        .query("CREATE doc_changes CONTENT $change")
        .bind(("change", change.clone()))
        .await?
        .check()?;
    prune(db, &change.project).await?;
    Ok(())
}

/// Delete all but the most recent [`RETENTION_PER_PROJECT`] rows for
/// `project`.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn prune(db: &Database, project: &str) -> StorageResult<()> {
    db.client()
        .query(
            "DELETE doc_changes WHERE project = $project \
             AND id NOT IN (\
                SELECT VALUE id FROM doc_changes WHERE project = $project \
                ORDER BY created_at DESC LIMIT $keep\
             )",
        )
        .bind(("project", project.to_string()))
        .bind(("keep", RETENTION_PER_PROJECT as i64))
        .await?
        .check()?;
    Ok(())
}

/// Fetch the most recent `limit` document changes for a project.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn recent(
    db: &Database,
    project: &str,
    limit: usize,
) -> StorageResult<Vec<DocumentChange>> {
    let mut response = db
        .client()
        .query(
            "SELECT * FROM doc_changes WHERE project = $project \
             ORDER BY created_at DESC LIMIT $limit",
        )
        .bind(("project", project.to_string()))
        .bind(("limit", limit as i64))
        .await?
        .check()?;
    Ok(response.take(0)?)
}
