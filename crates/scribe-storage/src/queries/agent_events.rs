//! Queries against `agent_events`, an append-only audit trail.

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::{AgentEvent, AgentEventType};

/// Append an audit event. Never updated or deleted.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn insert(db: &Database, event: &AgentEvent) -> StorageResult<()> {
    db.client()
        .query("CREATE agent_events CONTENT $event")
        .bind(("event", event.clone()))
        .await?
        .check()?;
    Ok(())
}

/// List events, optionally filtered by agent and/or event type, newest
/// first, bounded by `limit`.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn list(
    db: &Database,
    agent_id: Option<&str>,
    event_type: Option<AgentEventType>,
    limit: usize,
) -> StorageResult<Vec<AgentEvent>> {
    let mut clauses = Vec::new();
    if agent_id.is_some() {
        clauses.push("agent_id = $agent_id".to_string());
    }
    if event_type.is_some() {
        clauses.push("event_type = $event_type".to_string());
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql =
        format!("SELECT * FROM agent_events {where_clause} ORDER BY created_at DESC LIMIT $limit");

    let mut q = db.client().query(sql);
    if let Some(agent_id) = agent_id {
        q = q.bind(("agent_id", agent_id.to_string()));
    }
    if let Some(event_type) = event_type {
        q = q.bind(("event_type", event_type));
    }
    q = q.bind(("limit", limit as i64));

    let mut response = q.await?.check()?;
    Ok(response.take(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VersionInfo;
    use chrono::Utc;
    use std::collections::HashMap;

    fn sample(agent_id: &str, event_type: AgentEventType) -> AgentEvent {
        AgentEvent {
            event_type,
            agent_id: agent_id.to_string(),
            from_project: None,
            to_project: Some("demo".to_string()),
            version_info: VersionInfo {
                before: Some(1),
                expected: Some(1),
                after: Some(2),
            },
            success: true,
            context: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_list_filters_by_agent() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        insert(&db, &sample("a", AgentEventType::ProjectSet))
            .await
            .unwrap();
        insert(&db, &sample("b", AgentEventType::ProjectSet))
            .await
            .unwrap();

        let events = list(&db, Some("a"), None, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].agent_id, "a");
    }
}
