//! Queries against `scribe_projects`.

use chrono::Utc;

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::models::Project;

/// Create a new project. A second call with the same `name` is rejected
/// with [`StorageError::Conflict`]-shaped semantics reported as
/// [`StorageError::Internal`], since project creation is not a CAS surface;
/// callers should check [`get_by_name`] first when idempotent creation is
/// desired.
///
/// # Errors
///
/// Returns [`StorageError`] on a query or uniqueness failure.
pub async fn create(db: &Database, project: &Project) -> StorageResult<()> {
    let mut response = db
        .client()
        .query("CREATE scribe_projects CONTENT $project")
        .bind(("project", project.clone()))
        .await?
        .check()?;
    let created: Option<Project> = response.take(0)?;
    if created.is_none() {
        return Err(StorageError::Internal(format!(
            "failed to create project {}",
            project.name
        )));
    }
    Ok(())
}

/// Look up a project by its unique name.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn get_by_name(db: &Database, name: &str) -> StorageResult<Option<Project>> {
    let mut response = db
        .client()
        .query("SELECT * FROM scribe_projects WHERE name = $name LIMIT 1")
        .bind(("name", name.to_string()))
        .await?
        .check()?;
    let rows: Vec<Project> = response.take(0)?;
    Ok(rows.into_iter().next())
}

/// List all known projects, newest-created first.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn list(db: &Database) -> StorageResult<Vec<Project>> {
    let mut response = db
        .client()
        .query("SELECT * FROM scribe_projects ORDER BY created_at DESC")
        .await?
        .check()?;
    Ok(response.take(0)?)
}

/// Touch `last_access_at` for a project, used by `get_project`/`set_project`.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn touch_access(db: &Database, name: &str) -> StorageResult<()> {
    db.client()
        .query(
            "UPDATE scribe_projects SET last_access_at = $now, updated_at = $now \
             WHERE name = $name",
        )
        .bind(("name", name.to_string()))
        .bind(("now", Utc::now()))
        .await?
        .check()?;
    Ok(())
}

/// Touch `last_entry_at` for a project, called right after an append.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn touch_entry(db: &Database, name: &str) -> StorageResult<()> {
    db.client()
        .query(
            "UPDATE scribe_projects SET last_entry_at = $now, updated_at = $now \
             WHERE name = $name",
        )
        .bind(("name", name.to_string()))
        .bind(("now", Utc::now()))
        .await?
        .check()?;
    Ok(())
}

/// Record a document's content hash, seeding the baseline on first sight.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn record_doc_hash(
    db: &Database,
    project: &str,
    doc_name: &str,
    hash: &str,
) -> StorageResult<()> {
    let existing = get_by_name(db, project).await?;
    let has_baseline = existing
        .as_ref()
        .and_then(|p| p.doc_hashes.get(doc_name))
        .is_some_and(|pair| pair.baseline.is_some());

    if has_baseline {
        db.client()
            .query(format!(
                "UPDATE scribe_projects SET doc_hashes.{doc_name}.current = $hash, \
                 updated_at = $now WHERE name = $project"
            ))
            .bind(("project", project.to_string()))
            .bind(("hash", hash.to_string()))
            .bind(("now", Utc::now()))
            .await?
            .check()?;
    } else {
        db.client()
            .query(format!(
                "UPDATE scribe_projects SET doc_hashes.{doc_name} = {{ baseline: $hash, \
                 current: $hash }}, updated_at = $now WHERE name = $project"
            ))
            .bind(("project", project.to_string()))
            .bind(("hash", hash.to_string()))
            .bind(("now", Utc::now()))
            .await?
            .check()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;
    use std::collections::HashMap;

    fn sample(name: &str) -> Project {
        Project {
            name: name.to_string(),
            repo_root: "/repo".to_string(),
            progress_log_path: "docs/dev_plans/progress.md".to_string(),
            status: ProjectStatus::Planning,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_entry_at: None,
            last_access_at: None,
            last_status_change: None,
            description: None,
            tags: Vec::new(),
            doc_hashes: HashMap::new(),
            meta: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        create(&db, &sample("demo")).await.unwrap();
        let fetched = get_by_name(&db, "demo").await.unwrap();
        assert_eq!(fetched.unwrap().name, "demo");
    }

    #[tokio::test]
    async fn record_doc_hash_sets_baseline_then_updates_current() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        create(&db, &sample("demo")).await.unwrap();

        record_doc_hash(&db, "demo", "progress_log", "hash-a")
            .await
            .unwrap();
        let after_first = get_by_name(&db, "demo").await.unwrap().unwrap();
        let pair = after_first.doc_hashes.get("progress_log").unwrap();
        assert_eq!(pair.baseline.as_deref(), Some("hash-a"));
        assert_eq!(pair.current.as_deref(), Some("hash-a"));

        record_doc_hash(&db, "demo", "progress_log", "hash-b")
            .await
            .unwrap();
        let after_second = get_by_name(&db, "demo").await.unwrap().unwrap();
        let pair = after_second.doc_hashes.get("progress_log").unwrap();
        assert_eq!(pair.baseline.as_deref(), Some("hash-a"));
        assert_eq!(pair.current.as_deref(), Some("hash-b"));
    }
}
