//! Persisted cooldown cache: an in-memory map hydrated from, and
//! periodically flushed to, a JSON file on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{ReminderError, ReminderResult};
use crate::hash::cooldown_cache_key;

/// In-memory cooldown cache backed by a JSON file.
///
/// Entries are keyed by the human-readable
/// `{project_root}|{agent_id}|{tool_name}|{reminder_key}` string (see
/// [`cooldown_cache_key`]) rather than the SHA-256 reminder-hash, so
/// that [`CooldownCache::reset_scoped`] can match by prefix without
/// needing to invert a hash.
pub struct CooldownCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl CooldownCache {
    /// Load the cache from `path`, treating a missing or unparsable
    /// file as an empty cache (matching the original's tolerant
    /// startup behavior).
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Timestamp the cache key was last shown, if ever.
    #[must_use]
    pub fn last_shown(&self, cache_key: &str) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .expect("cooldown cache lock poisoned")
            .get(cache_key)
            .copied()
    }

    /// Record that `cache_key` was shown at `now`, then persist.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::FileIo`] if the write fails.
    pub async fn record(&self, cache_key: &str, now: DateTime<Utc>) -> ReminderResult<()> {
        {
            let mut guard = self.entries.write().expect("cooldown cache lock poisoned");
            guard.insert(cache_key.to_string(), now);
        }
        self.persist().await
    }

    /// Clear every cached entry whose key starts with
    /// `{project_root}|{agent_id}|`, returning the count cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::FileIo`] if the write fails.
    pub async fn reset_scoped(&self, project_root: &str, agent_id: &str) -> ReminderResult<usize> {
        let prefix = format!("{project_root}|{agent_id}|");
        let cleared = {
            let mut guard = self.entries.write().expect("cooldown cache lock poisoned");
            let before = guard.len();
            guard.retain(|key, _| !key.starts_with(&prefix));
            before - guard.len()
        };
        if cleared > 0 {
            self.persist().await?;
        }
        Ok(cleared)
    }

    async fn persist(&self) -> ReminderResult<()> {
        let serialized = {
            let guard = self.entries.read().expect("cooldown cache lock poisoned");
            serde_json::to_vec_pretty(&*guard)
                .map_err(|e| ReminderError::CacheParse(e.to_string()))?
        };
        scribe_fileio::atomic::atomic_write(&self.path, &serialized).await?;
        Ok(())
    }
}

/// Convenience wrapper combining [`cooldown_cache_key`] with a cache
/// lookup, for callers that only have the scope fields in hand.
#[must_use]
pub fn last_shown_for(
    cache: &CooldownCache,
    project_root: &str,
    agent_id: &str,
    tool_name: &str,
    reminder_key: &str,
) -> Option<DateTime<Utc>> {
    cache.last_shown(&cooldown_cache_key(project_root, agent_id, tool_name, reminder_key))
}

/// Default path for the cooldown cache, relative to a `.scribe`
/// directory under the repository root.
#[must_use]
pub fn default_cache_path(scribe_dir: &Path) -> PathBuf {
    scribe_dir.join("reminder_cooldowns.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_then_reload_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_cache_path(dir.path());
        let cache = CooldownCache::load(&path);
        let key = cooldown_cache_key("/tmp/repo", "agentA", "append_entry", "logging.stale_log");
        cache.record(&key, Utc::now()).await.unwrap();

        let reloaded = CooldownCache::load(&path);
        assert!(reloaded.last_shown(&key).is_some());
    }

    #[tokio::test]
    async fn reset_scoped_clears_only_matching_project_and_agent() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_cache_path(dir.path());
        let cache = CooldownCache::load(&path);
        let now = Utc::now();
        cache
            .record(&cooldown_cache_key("/tmp/repo", "agentA", "append_entry", "r1"), now)
            .await
            .unwrap();
        cache
            .record(&cooldown_cache_key("/tmp/repo", "agentB", "append_entry", "r2"), now)
            .await
            .unwrap();
        cache
            .record(&cooldown_cache_key("/other/repo", "agentA", "append_entry", "r3"), now)
            .await
            .unwrap();

        let cleared = cache.reset_scoped("/tmp/repo", "agentA").await.unwrap();
        assert_eq!(cleared, 1);
        assert!(cache
            .last_shown(&cooldown_cache_key("/tmp/repo", "agentA", "append_entry", "r1"))
            .is_none());
        assert!(cache
            .last_shown(&cooldown_cache_key("/tmp/repo", "agentB", "append_entry", "r2"))
            .is_some());
        assert!(cache
            .last_shown(&cooldown_cache_key("/other/repo", "agentA", "append_entry", "r3"))
            .is_some());
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CooldownCache::load(dir.path().join("nonexistent.json"));
        assert!(cache.last_shown("anything").is_none());
    }
}
