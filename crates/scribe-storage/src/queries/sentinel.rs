//! Queries against `sentinel_cases` and its per-day sequence counter.

use chrono::Utc;

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::{FixLink, SentinelCase, SentinelCaseKind};

/// Atomically assign the next per-day sequence number for `kind`/`day`,
/// creating the counter row at 1 if this is the first case of the day.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn next_seq(db: &Database, kind: SentinelCaseKind, day: &str) -> StorageResult<u32> {
    let kind_str = kind.prefix().to_ascii_lowercase();
    let mut response = db
        .client()
        .query(
            "UPDATE sentinel_case_counters SET count += 1 \
             WHERE kind = $kind AND day = $day RETURNING *",
        )
        .bind(("kind", kind_str.clone()))
        .bind(("day", day.to_string()))
        .await?
        .check()?;
    #[derive(serde::Deserialize)]
    struct Counter {
        count: i64,
    }
    let rows: Vec<Counter> = response.take(0)?;
    if let Some(row) = rows.into_iter().next() {
        return Ok(row.count as u32);
    }

    db.client()
        .query("CREATE sentinel_case_counters CONTENT { kind: $kind, day: $day, count: 1 }")
        .bind(("kind", kind_str))
        .bind(("day", day.to_string()))
        .await?
        .check()?;
    Ok(1)
}

/// Open a new case, assigning its sequence number and rendering its ID.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn open_case(
    db: &Database,
    kind: SentinelCaseKind,
    day: &str,
    title: &str,
    symptoms: &str,
    affected_paths: Vec<String>,
) -> StorageResult<SentinelCase> {
    let seq = next_seq(db, kind, day).await?;
    let case_id = format!("{}-{day}-{seq:04}", kind.prefix());
    let now = Utc::now();
    let case = SentinelCase {
        case_id: case_id.clone(),
        kind,
        day: day.to_string(),
        seq,
        title: title.to_string(),
        symptoms: symptoms.to_string(),
        affected_paths,
        landing_status: "proposed".to_string(),
        fix_links: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    db.client()
        .query("CREATE sentinel_cases CONTENT $case")
        .bind(("case", case.clone()))
        .await?
        .check()?;
    Ok(case)
}

/// Fetch a case by its rendered ID.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn get_case(db: &Database, case_id: &str) -> StorageResult<Option<SentinelCase>> {
    let mut response = db
        .client()
        .query("SELECT * FROM sentinel_cases WHERE case_id = $case_id LIMIT 1")
        .bind(("case_id", case_id.to_string()))
        .await?
        .check()?;
    let rows: Vec<SentinelCase> = response.take(0)?;
    Ok(rows.into_iter().next())
}

/// Append a fix artifact link and update `landing_status`.
///
/// # Errors
///
/// Returns [`crate::StorageError::NotFound`] if `case_id` does not exist,
/// or [`crate::StorageError`] on a query failure.
pub async fn link_fix(
    db: &Database,
    case_id: &str,
    execution_id: &str,
    artifact_ref: &str,
    landing_status: &str,
) -> StorageResult<SentinelCase> {
    let link = FixLink {
        execution_id: execution_id.to_string(),
        artifact_ref: artifact_ref.to_string(),
        linked_at: Utc::now(),
    };
    let mut response = db
        .client()
        .query(
            "UPDATE sentinel_cases SET fix_links += $link, landing_status = $status, \
             updated_at = $now WHERE case_id = $case_id RETURNING *",
        )
        .bind(("case_id", case_id.to_string()))
        .bind(("link", link))
        .bind(("status", landing_status.to_string()))
        .bind(("now", Utc::now()))
        .await?
        .check()?;
    let rows: Vec<SentinelCase> = response.take(0)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| crate::error::StorageError::NotFound(case_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_case_assigns_sequential_ids_per_day_and_kind() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();

        let first = open_case(&db, SentinelCaseKind::Bug, "2026-07-27", "t1", "s1", vec![])
            .await
            .unwrap();
        let second = open_case(&db, SentinelCaseKind::Bug, "2026-07-27", "t2", "s2", vec![])
            .await
            .unwrap();
        let security = open_case(&db, SentinelCaseKind::Security, "2026-07-27", "t3", "s3", vec![])
            .await
            .unwrap();

        assert_eq!(first.case_id, "BUG-2026-07-27-0001");
        assert_eq!(second.case_id, "BUG-2026-07-27-0002");
        assert_eq!(security.case_id, "SEC-2026-07-27-0001");
    }

    #[tokio::test]
    async fn link_fix_appends_and_updates_status() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let case = open_case(&db, SentinelCaseKind::Bug, "2026-07-27", "t", "s", vec![])
            .await
            .unwrap();

        let updated = link_fix(&db, &case.case_id, "exec-1", "commit:abc", "fixed")
            .await
            .unwrap();
        assert_eq!(updated.fix_links.len(), 1);
        assert_eq!(updated.landing_status, "fixed");
    }

    #[tokio::test]
    async fn link_fix_missing_case_errors() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let err = link_fix(&db, "BUG-2026-07-27-9999", "exec-1", "commit:abc", "fixed")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::StorageError::NotFound(_)));
    }
}
