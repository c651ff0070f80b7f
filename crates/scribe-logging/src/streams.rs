//! Log stream registry: path templates and required metadata per
//! standard stream.

use std::path::{Path, PathBuf};

use crate::error::LoggingError;

/// One of the four standard log streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// The project's primary progress log. No required metadata.
    Progress,
    /// `{docs_dir}/DOC_LOG.md`, requires `doc`, `section`, `action`.
    DocUpdates,
    /// `{docs_dir}/SECURITY_LOG.md`, requires `severity`, `area`, `impact`.
    Security,
    /// `{docs_dir}/BUG_LOG.md`, requires `severity`, `component`, `status`.
    Bugs,
}

impl Stream {
    /// Resolve a stream by its wire name (`"progress"`, `"doc_updates"`,
    /// `"security"`, `"bugs"`).
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnknownStream`] for anything else.
    pub fn parse(name: &str) -> Result<Self, LoggingError> {
        match name {
            "progress" => Ok(Self::Progress),
            "doc_updates" => Ok(Self::DocUpdates),
            "security" => Ok(Self::Security),
            "bugs" => Ok(Self::Bugs),
            other => Err(LoggingError::UnknownStream(other.to_string())),
        }
    }

    /// Path template relative to the project, with `{docs_dir}`/
    /// `{progress_log}` placeholders left unresolved.
    #[must_use]
    pub fn path_template(self) -> &'static str {
        match self {
            Self::Progress => "{progress_log}",
            Self::DocUpdates => "{docs_dir}/DOC_LOG.md",
            Self::Security => "{docs_dir}/SECURITY_LOG.md",
            Self::Bugs => "{docs_dir}/BUG_LOG.md",
        }
    }

    /// Resolve this stream's on-disk path by filling `{docs_dir}` (or, for
    /// [`Self::Progress`], taking `docs_dir` itself as the progress-log path).
    #[must_use]
    pub fn resolve_path(self, docs_dir: &Path) -> PathBuf {
        match self {
            Self::Progress => docs_dir.to_path_buf(),
            Self::DocUpdates => docs_dir.join("DOC_LOG.md"),
            Self::Security => docs_dir.join("SECURITY_LOG.md"),
            Self::Bugs => docs_dir.join("BUG_LOG.md"),
        }
    }

    /// Metadata keys that must be present before an entry may be written
    /// to this stream.
    #[must_use]
    pub fn required_metadata(self) -> &'static [&'static str] {
        match self {
            Self::Progress => &[],
            Self::DocUpdates => &["doc", "section", "action"],
            Self::Security => &["severity", "area", "impact"],
            Self::Bugs => &["severity", "component", "status"],
        }
    }

    /// Check `meta` against [`Self::required_metadata`], returning the
    /// names of any missing keys.
    #[must_use]
    pub fn missing_metadata(self, meta: &std::collections::BTreeMap<String, String>) -> Vec<String> {
        self.required_metadata()
            .iter()
            .filter(|key| !meta.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn bugs_stream_reports_missing_keys() {
        let meta = BTreeMap::new();
        let missing = Stream::Bugs.missing_metadata(&meta);
        assert_eq!(missing, vec!["severity", "component", "status"]);
    }

    #[test]
    fn bugs_stream_satisfied_when_all_keys_present() {
        let mut meta = BTreeMap::new();
        meta.insert("severity".to_string(), "high".to_string());
        meta.insert("component".to_string(), "auth".to_string());
        meta.insert("status".to_string(), "open".to_string());
        assert!(Stream::Bugs.missing_metadata(&meta).is_empty());
    }

    #[test]
    fn bugs_stream_resolves_under_docs_dir() {
        let docs_dir = Path::new("/repo/docs/dev_plans/demo");
        assert_eq!(
            Stream::Bugs.resolve_path(docs_dir),
            docs_dir.join("BUG_LOG.md")
        );
    }

    #[test]
    fn unknown_stream_name_errors() {
        assert!(matches!(
            Stream::parse("nonsense"),
            Err(LoggingError::UnknownStream(_))
        ));
    }
}
