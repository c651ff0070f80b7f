//! Environment-variable overrides consumed at process startup.

use std::env;
use std::path::PathBuf;

/// Overrides read from the process environment, applied on top of
/// whatever `RepoConfig`/discovery produced.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `SCRIBE_REPO_ROOT` — skip discovery and use this root directly.
    pub repo_root: Option<PathBuf>,
    /// `SCRIBE_STATE_PATH` — override the persisted-state JSON file location.
    pub state_path: Option<PathBuf>,
    /// `SCRIBE_DEFAULT_PROJECT` — project name used when none is set.
    pub default_project_name: Option<String>,
    /// `SCRIBE_DEFAULT_PROJECT_SLUG` — project slug used when none is set.
    pub default_project_slug: Option<String>,
    /// `SCRIBE_AGENT_KIND` — see [`scribe_core::identity`].
    pub agent_kind: Option<String>,
    /// `SCRIBE_AGENT_MODEL` (or `CODEX_MODEL`) — see [`scribe_core::identity`].
    pub agent_model: Option<String>,
    /// `SCRIBE_REMINDER_CACHE_PATH` — override the cooldown cache file location.
    pub reminder_cache_path: Option<PathBuf>,
    /// `SCRIBE_SESSION_AWARE_HASHES` — `1`/`true` enables session-scoped
    /// reminder hashing.
    pub session_aware_hashes: Option<bool>,
}

impl EnvOverrides {
    /// Read every recognized override from the current process
    /// environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            repo_root: env::var("SCRIBE_REPO_ROOT").ok().map(PathBuf::from),
            state_path: env::var("SCRIBE_STATE_PATH").ok().map(PathBuf::from),
            default_project_name: env::var("SCRIBE_DEFAULT_PROJECT").ok(),
            default_project_slug: env::var("SCRIBE_DEFAULT_PROJECT_SLUG").ok(),
            agent_kind: env::var("SCRIBE_AGENT_KIND").ok(),
            agent_model: env::var("SCRIBE_AGENT_MODEL")
                .or_else(|_| env::var("CODEX_MODEL"))
                .ok(),
            reminder_cache_path: env::var("SCRIBE_REMINDER_CACHE_PATH").ok().map(PathBuf::from),
            session_aware_hashes: env::var("SCRIBE_SESSION_AWARE_HASHES")
                .ok()
                .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "True")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_vars_yield_none_fields() {
        let overrides = EnvOverrides {
            repo_root: None,
            ..EnvOverrides::default()
        };
        assert!(overrides.repo_root.is_none());
        assert!(overrides.session_aware_hashes.is_none());
    }

    #[test]
    fn session_aware_hashes_parses_truthy_values() {
        // SAFETY (test-only): no other test in this process reads this var
        // concurrently; scoped removal below avoids leaking state across tests.
        unsafe {
            env::set_var("SCRIBE_SESSION_AWARE_HASHES", "true");
        }
        let overrides = EnvOverrides::from_env();
        unsafe {
            env::remove_var("SCRIBE_SESSION_AWARE_HASHES");
        }
        assert_eq!(overrides.session_aware_hashes, Some(true));
    }
}
