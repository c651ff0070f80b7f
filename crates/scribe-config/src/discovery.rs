//! Repository root discovery and the configuration file search order.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::repo_config::RepoConfig;

const ROOT_MARKERS: &[&str] = &[".git", ".scribe", "pyproject.toml", "package.json", "Cargo.toml", "go.mod"];

/// Walk up from `start` looking for a repository-root marker,
/// checking the filesystem root itself as a last resort.
#[must_use]
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    loop {
        if ROOT_MARKERS.iter().any(|marker| current.join(marker).exists()) {
            return Some(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }
    ROOT_MARKERS
        .iter()
        .any(|marker| current.join(marker).exists())
        .then_some(current)
}

/// Candidate config file paths, in search order, relative to a
/// repository root.
fn candidate_paths(repo_root: &Path) -> Vec<PathBuf> {
    vec![
        repo_root.join(".scribe").join("scribe.yaml"),
        repo_root.join(".scribe").join("scribe.yml"),
        repo_root.join("docs").join("dev_plans").join("scribe.yaml"),
        repo_root.join(".scribe").join("config.json"),
    ]
}

/// Load configuration for `repo_root`, trying each candidate path in
/// order and falling back to defaults if none parse. A parse failure
/// on one candidate is logged and discovery continues to the next.
#[must_use]
pub fn load_config(repo_root: &Path) -> RepoConfig {
    for path in candidate_paths(repo_root) {
        if !path.is_file() {
            continue;
        }
        let Ok(raw) = std::fs::read_to_string(&path) else {
            continue;
        };
        let parsed = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str::<RepoConfig>(&raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<RepoConfig>(&raw).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(config) => {
                info!(path = %path.display(), "loaded scribe config");
                return config.with_repo_root(repo_root);
            },
            Err(message) => {
                warn!(path = %path.display(), error = %message, "failed to parse scribe config, trying next candidate");
            },
        }
    }
    RepoConfig::defaults_for_repo(repo_root)
}

/// Write a default `scribe.yaml` under `.scribe/` if no config file
/// exists yet, so the repository has a concrete file to edit.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the directory or file cannot be created.
pub fn ensure_config(repo_root: &Path, config: &RepoConfig) -> ConfigResult<()> {
    let scribe_dir = repo_root.join(".scribe");
    std::fs::create_dir_all(&scribe_dir)?;
    let config_file = scribe_dir.join("scribe.yaml");
    if config_file.exists() {
        return Ok(());
    }
    let rendered = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseFailed {
        path: config_file.clone(),
        source: e.to_string(),
    })?;
    std::fs::write(&config_file, rendered)?;
    Ok(())
}

/// Discover the repository root from `start`, or fail with
/// [`ConfigError::RepoRootNotFound`].
///
/// # Errors
///
/// Returns [`ConfigError::RepoRootNotFound`] if no marker is found.
pub fn discover_or_create(start: &Path) -> ConfigResult<(PathBuf, RepoConfig)> {
    let repo_root = find_repo_root(start).ok_or_else(|| ConfigError::RepoRootNotFound {
        start: start.to_path_buf(),
    })?;
    let config = load_config(&repo_root);
    std::fs::create_dir_all(config.dev_plans_path())?;
    Ok((repo_root, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_via_git_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        let found = find_repo_root(&nested).unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn missing_marker_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_repo_root(dir.path()).is_none());
    }

    #[test]
    fn load_config_falls_back_to_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.progress_log_name, "PROGRESS_LOG.md");
    }

    #[test]
    fn load_config_reads_scribe_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".scribe")).unwrap();
        std::fs::write(
            dir.path().join(".scribe/scribe.yaml"),
            "repo_slug: custom-name\nprogress_log_name: LOG.md\n",
        )
        .unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.repo_slug, "custom-name");
        assert_eq!(config.progress_log_name, "LOG.md");
    }

    #[test]
    fn load_config_skips_unparsable_candidate_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".scribe")).unwrap();
        std::fs::write(dir.path().join(".scribe/scribe.yaml"), "not: valid: yaml: [").unwrap();
        std::fs::write(
            dir.path().join(".scribe/config.json"),
            r#"{"repo_slug": "fallback"}"#,
        )
        .unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.repo_slug, "fallback");
    }

    #[test]
    fn ensure_config_writes_default_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig::defaults_for_repo(dir.path());
        ensure_config(dir.path(), &config).unwrap();
        assert!(dir.path().join(".scribe/scribe.yaml").exists());
    }
}
