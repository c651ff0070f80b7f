//! Cooldown-aware, session-aware, priority-weighted reminder selection.

use std::sync::Arc;

use chrono::Utc;
use scribe_storage::models::{OperationStatus, ReminderHistoryEntry};
use scribe_storage::{queries, Database};
use uuid::Uuid;

use crate::catalog::{Category, ReminderDefinition};
use crate::context::ReminderContext;
use crate::cooldown::CooldownCache;
use crate::error::ReminderResult;
use crate::hash::{cooldown_cache_key, reminder_hash};

/// Default maximum number of reminders attached to a single response.
pub const DEFAULT_MAX_REMINDERS: usize = 5;

/// A reminder candidate, before the cooldown/teaching-cap filter runs.
#[derive(Debug, Clone)]
pub struct ReminderCandidate {
    /// The definition this candidate instantiates.
    pub definition: ReminderDefinition,
    /// Rendered message text.
    pub message: String,
}

/// A reminder selected for inclusion in a tool response.
#[derive(Debug, Clone)]
pub struct SelectedReminder {
    /// Dotted reminder key.
    pub key: String,
    /// Urgency tier.
    pub level: crate::catalog::Level,
    /// Rendered message text.
    pub message: String,
    /// Selection score.
    pub score: i32,
    /// Relative weight within the definition's category, the final
    /// tiebreaker after level and score.
    pub category_weight: i32,
}

/// Ties together the persisted cooldown cache and the durable
/// reminder-history audit trail.
pub struct ReminderEngine {
    db: Arc<Database>,
    cache: CooldownCache,
    session_aware_hashes: bool,
    max_reminders: usize,
}

impl ReminderEngine {
    /// Build an engine over an already-loaded cooldown cache.
    #[must_use]
    pub fn new(db: Arc<Database>, cache: CooldownCache, session_aware_hashes: bool) -> Self {
        Self {
            db,
            cache,
            session_aware_hashes,
            max_reminders: DEFAULT_MAX_REMINDERS,
        }
    }

    /// Override the default truncation limit.
    #[must_use]
    pub fn with_max_reminders(mut self, max_reminders: usize) -> Self {
        self.max_reminders = max_reminders;
        self
    }

    /// Filter, select, and record reminders for one tool invocation.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ReminderError`] if a storage or cache
    /// write fails.
    pub async fn select(
        &self,
        context: &ReminderContext,
        session_id: Uuid,
        candidates: Vec<ReminderCandidate>,
    ) -> ReminderResult<Vec<SelectedReminder>> {
        let mut shown = Vec::new();
        let now = Utc::now();

        for candidate in candidates {
            let def = candidate.definition;
            let decision = self.decide(context, session_id, def).await?;
            if !decision {
                continue;
            }

            let cache_key = cooldown_cache_key(
                &context.project_root,
                &context.agent_id,
                &context.tool_name,
                def.key,
            );
            self.cache.record(&cache_key, now).await?;

            let hash = reminder_hash(
                &context.project_root,
                &context.agent_id,
                &context.tool_name,
                def.key,
                context.session_id.as_deref(),
                self.session_aware_hashes,
            );
            queries::reminders::insert(
                &self.db,
                &ReminderHistoryEntry {
                    session_id,
                    reminder_hash: hash,
                    project_root: context.project_root.clone(),
                    agent_id: context.agent_id.clone(),
                    tool_name: context.tool_name.clone(),
                    reminder_key: def.key.to_string(),
                    shown_at: now,
                    operation_status: context.operation_status,
                    context_metadata: Default::default(),
                },
            )
            .await?;

            shown.push(SelectedReminder {
                key: def.key.to_string(),
                level: def.level,
                message: candidate.message,
                score: def.score,
                category_weight: def.category_weight,
            });
        }

        shown.sort_by(|a, b| {
            b.level
                .priority()
                .cmp(&a.level.priority())
                .then(b.score.cmp(&a.score))
                .then(b.category_weight.cmp(&a.category_weight))
        });
        shown.truncate(self.max_reminders);
        Ok(shown)
    }

    async fn decide(
        &self,
        context: &ReminderContext,
        session_id: Uuid,
        def: ReminderDefinition,
    ) -> ReminderResult<bool> {
        if context.operation_status == OperationStatus::Failure {
            return Ok(true);
        }

        if def.category == Category::Teaching {
            let count = queries::reminders::count_for_key(&self.db, session_id, def.key).await?;
            if count >= teaching_cap(def) {
                return Ok(false);
            }
        }

        let cache_key = cooldown_cache_key(
            &context.project_root,
            &context.agent_id,
            &context.tool_name,
            def.key,
        );
        if let Some(last) = self.cache.last_shown(&cache_key) {
            let elapsed = Utc::now().signed_duration_since(last);
            if elapsed < chrono::Duration::minutes(def.cooldown_minutes) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Per-session cap on how many times a teaching-category reminder may
/// fire before cooldown-independent suppression kicks in.
fn teaching_cap(_def: ReminderDefinition) -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MISSING_METADATA, STALE_LOG};
    use std::collections::BTreeMap;

    async fn db() -> Arc<Database> {
        let db = Database::connect_memory().await.unwrap();
        scribe_storage::schema::setup(&db).await.unwrap();
        Arc::new(db)
    }

    fn ctx(status: OperationStatus) -> ReminderContext {
        ReminderContext {
            tool_name: "append_entry".to_string(),
            project_name: Some("demo".to_string()),
            project_root: "/tmp/repo".to_string(),
            agent_id: "agent-a".to_string(),
            session_id: None,
            total_entries: 1,
            minutes_since_log: None,
            last_log_time: None,
            docs_status: BTreeMap::new(),
            docs_changed: Vec::new(),
            current_phase: None,
            session_age_minutes: None,
            operation_status: status,
            variables: BTreeMap::new(),
        }
    }

    fn candidate(def: ReminderDefinition) -> ReminderCandidate {
        ReminderCandidate {
            definition: def,
            message: "test message".to_string(),
        }
    }

    #[tokio::test]
    async fn first_fire_is_always_shown() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("cooldowns.json"));
        let engine = ReminderEngine::new(db().await, cache, false);
        let session_id = Uuid::new_v4();
        let out = engine
            .select(&ctx(OperationStatus::Success), session_id, vec![candidate(STALE_LOG)])
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn second_fire_within_cooldown_is_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("cooldowns.json"));
        let engine = ReminderEngine::new(db().await, cache, false);
        let session_id = Uuid::new_v4();
        let first = engine
            .select(&ctx(OperationStatus::Success), session_id, vec![candidate(STALE_LOG)])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        let second = engine
            .select(&ctx(OperationStatus::Success), session_id, vec![candidate(STALE_LOG)])
            .await
            .unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn failure_bypasses_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("cooldowns.json"));
        let engine = ReminderEngine::new(db().await, cache, false);
        let session_id = Uuid::new_v4();
        engine
            .select(&ctx(OperationStatus::Success), session_id, vec![candidate(STALE_LOG)])
            .await
            .unwrap();
        let second = engine
            .select(&ctx(OperationStatus::Failure), session_id, vec![candidate(STALE_LOG)])
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn teaching_cap_suppresses_after_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db = db().await;
        let session_id = Uuid::new_v4();
        for _ in 0..teaching_cap(MISSING_METADATA) {
            let cache = CooldownCache::load(dir.path().join(format!("{}.json", Uuid::new_v4())));
            let engine = ReminderEngine::new(db.clone(), cache, false);
            let out = engine
                .select(&ctx(OperationStatus::Success), session_id, vec![candidate(MISSING_METADATA)])
                .await
                .unwrap();
            assert_eq!(out.len(), 1);
        }
        let cache = CooldownCache::load(dir.path().join(format!("{}.json", Uuid::new_v4())));
        let engine = ReminderEngine::new(db, cache, false);
        let out = engine
            .select(&ctx(OperationStatus::Success), session_id, vec![candidate(MISSING_METADATA)])
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn selection_sorts_urgent_before_info() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("cooldowns.json"));
        let engine = ReminderEngine::new(db().await, cache, false);
        let session_id = Uuid::new_v4();
        let out = engine
            .select(
                &ctx(OperationStatus::Failure),
                session_id,
                vec![candidate(crate::catalog::IDLE_RESUMED), candidate(MISSING_METADATA)],
            )
            .await
            .unwrap();
        assert_eq!(out[0].key, MISSING_METADATA.key);
    }

    #[tokio::test]
    async fn selection_breaks_level_and_score_ties_by_category_weight() {
        const LOW_WEIGHT: ReminderDefinition = ReminderDefinition {
            key: "test.low_weight",
            level: crate::catalog::Level::Warning,
            score: 50,
            category: Category::General,
            category_weight: 1,
            cooldown_minutes: 0,
        };
        const HIGH_WEIGHT: ReminderDefinition = ReminderDefinition {
            key: "test.high_weight",
            level: crate::catalog::Level::Warning,
            score: 50,
            category: Category::General,
            category_weight: 99,
            cooldown_minutes: 0,
        };

        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("cooldowns.json"));
        let engine = ReminderEngine::new(db().await, cache, false);
        let session_id = Uuid::new_v4();
        let out = engine
            .select(
                &ctx(OperationStatus::Success),
                session_id,
                vec![candidate(LOW_WEIGHT), candidate(HIGH_WEIGHT)],
            )
            .await
            .unwrap();
        assert_eq!(out[0].key, HIGH_WEIGHT.key);
        assert_eq!(out[1].key, LOW_WEIGHT.key);
    }
}
