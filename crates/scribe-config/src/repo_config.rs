//! Typed per-repository configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use scribe_sandbox::PermissionChecker;
use serde::{Deserialize, Serialize};

/// Which database driver a repository is configured to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Embedded SurrealKV file under `db_path`.
    Embedded,
    /// Remote SurrealDB server reachable at `db_url`.
    Server,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Embedded
    }
}

/// Per-repository configuration, loaded once per process and held in
/// memory; never persisted in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Short identifier for the repository, defaults to the root directory name.
    pub repo_slug: String,
    /// Absolute repository root.
    #[serde(skip)]
    pub repo_root: PathBuf,
    /// Directory holding per-project dev-plan documents, relative to the root.
    pub dev_plans_dir: PathBuf,
    /// File name used for each project's progress log.
    pub progress_log_name: String,
    /// Named template pack used for `generate_doc_templates`.
    pub templates_pack: String,
    /// Directory of repo-local template overrides, relative to the root.
    pub custom_templates_dir: Option<PathBuf>,
    /// Per-repository operation gates.
    pub permissions: PermissionChecker,
    /// Plugin directory, relative to the root.
    pub plugins_dir: Option<PathBuf>,
    /// Free-form plugin configuration, passed through unmodified.
    pub plugin_config: HashMap<String, serde_json::Value>,
    /// Default emoji used when a log entry carries no explicit priority.
    pub default_emoji: String,
    /// Default agent label when none is otherwise resolvable.
    pub default_agent: String,
    /// Overrides for the standard reminder catalog.
    pub reminder_config: HashMap<String, serde_json::Value>,
    /// Named shell hooks keyed by lifecycle event.
    pub hooks: HashMap<String, Option<String>>,
    /// Name the stdio server advertises itself under.
    pub mcp_server_name: String,
    /// Which storage driver to use.
    pub storage_backend: StorageBackend,
    /// Embedded database file path, relative to the root. Used when
    /// `storage_backend` is `embedded`.
    pub db_path: Option<PathBuf>,
    /// Remote database connection URL. Used when `storage_backend` is
    /// `server`.
    pub db_url: Option<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            repo_slug: String::new(),
            repo_root: PathBuf::new(),
            dev_plans_dir: PathBuf::from("docs/dev_plans"),
            progress_log_name: "PROGRESS_LOG.md".to_string(),
            templates_pack: "default".to_string(),
            custom_templates_dir: None,
            permissions: PermissionChecker::default(),
            plugins_dir: None,
            plugin_config: HashMap::new(),
            default_emoji: "📋".to_string(),
            default_agent: "Agent".to_string(),
            reminder_config: HashMap::new(),
            hooks: HashMap::new(),
            mcp_server_name: "scribe.mcp".to_string(),
            storage_backend: StorageBackend::default(),
            db_path: None,
            db_url: None,
        }
    }
}

impl RepoConfig {
    /// Build the default configuration for a freshly discovered
    /// repository, with no config file present.
    #[must_use]
    pub fn defaults_for_repo(repo_root: &Path) -> Self {
        Self {
            repo_slug: repo_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            repo_root: repo_root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Parse configuration loaded from a file, filling in `repo_root`
    /// and defaulting `repo_slug` from the directory name when absent.
    #[must_use]
    pub fn with_repo_root(mut self, repo_root: &Path) -> Self {
        if self.repo_slug.is_empty() {
            self.repo_slug = repo_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        self.repo_root = repo_root.to_path_buf();
        self
    }

    /// Absolute path to the dev-plans directory.
    #[must_use]
    pub fn dev_plans_path(&self) -> PathBuf {
        self.repo_root.join(&self.dev_plans_dir)
    }

    /// Absolute path to a project's progress log.
    #[must_use]
    pub fn progress_log_path(&self, project_name: &str) -> PathBuf {
        self.dev_plans_path().join(project_name).join(&self.progress_log_name)
    }

    /// Absolute path to a project's documentation directory.
    #[must_use]
    pub fn project_docs_dir(&self, project_name: &str) -> PathBuf {
        self.dev_plans_path().join(project_name)
    }

    /// Absolute path to the hidden `.scribe` directory.
    #[must_use]
    pub fn scribe_dir(&self) -> PathBuf {
        self.repo_root.join(".scribe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_slug_from_directory_name() {
        let config = RepoConfig::defaults_for_repo(Path::new("/tmp/my-repo"));
        assert_eq!(config.repo_slug, "my-repo");
    }

    #[test]
    fn progress_log_path_nests_under_project_name() {
        let config = RepoConfig::defaults_for_repo(Path::new("/tmp/my-repo"));
        let path = config.progress_log_path("demo");
        assert_eq!(path, PathBuf::from("/tmp/my-repo/docs/dev_plans/demo/PROGRESS_LOG.md"));
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let parsed: RepoConfig = serde_yaml::from_str("repo_slug: demo\n").unwrap();
        assert_eq!(parsed.repo_slug, "demo");
        assert_eq!(parsed.progress_log_name, "PROGRESS_LOG.md");
    }
}
