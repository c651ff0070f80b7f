//! Per-repository operation gates, independent of path location.

use serde::{Deserialize, Serialize};

use crate::error::{SandboxError, SandboxResult};

/// An operation that a repository's permission configuration may gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Rotating the progress log.
    Rotate,
    /// Generating document templates.
    GenerateDocs,
    /// Appending more than one log entry in a single call.
    BulkEntries,
    /// Requiring a project to be set before a tool may run.
    RequireProject,
}

impl Operation {
    fn field(self) -> &'static str {
        match self {
            Self::Rotate => "allow_rotate",
            Self::GenerateDocs => "allow_generate_docs",
            Self::BulkEntries => "allow_bulk_entries",
            Self::RequireProject => "require_project",
        }
    }
}

/// Per-repository flags controlling which operations a tool may perform.
///
/// `require_project` inverts the usual allow/deny sense: when `true`, a
/// project-scoped tool must refuse to run until `set_current_project` has
/// been called for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionChecker {
    /// Whether `rotate_log` may run.
    pub allow_rotate: bool,
    /// Whether `generate_docs` may run.
    pub allow_generate_docs: bool,
    /// Whether an append call may carry more than one entry at once.
    pub allow_bulk_entries: bool,
    /// Whether project-scoped tools require a project to already be set.
    pub require_project: bool,
}

impl Default for PermissionChecker {
    fn default() -> Self {
        Self {
            allow_rotate: true,
            allow_generate_docs: true,
            allow_bulk_entries: true,
            require_project: false,
        }
    }
}

impl PermissionChecker {
    /// Check whether `operation` is permitted.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::OperationDenied`] when the repository's
    /// configuration disallows the operation.
    pub fn check(&self, operation: Operation) -> SandboxResult<()> {
        let allowed = match operation {
            Operation::Rotate => self.allow_rotate,
            Operation::GenerateDocs => self.allow_generate_docs,
            Operation::BulkEntries => self.allow_bulk_entries,
            // `require_project` inverts sense: "allowed" means the gate
            // is satisfied, i.e. the flag is *not* set.
            Operation::RequireProject => !self.require_project,
        };
        if allowed {
            Ok(())
        } else {
            Err(SandboxError::OperationDenied {
                operation: operation.field().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_everything_but_require_project() {
        let checker = PermissionChecker::default();
        assert!(checker.check(Operation::Rotate).is_ok());
        assert!(checker.check(Operation::GenerateDocs).is_ok());
        assert!(checker.check(Operation::BulkEntries).is_ok());
        assert!(checker.check(Operation::RequireProject).is_ok());
    }

    #[test]
    fn denies_disallowed_rotate() {
        let checker = PermissionChecker {
            allow_rotate: false,
            ..PermissionChecker::default()
        };
        assert!(matches!(
            checker.check(Operation::Rotate),
            Err(SandboxError::OperationDenied { .. })
        ));
    }

    #[test]
    fn require_project_gate_denies_when_set() {
        let checker = PermissionChecker {
            require_project: true,
            ..PermissionChecker::default()
        };
        assert!(checker.check(Operation::RequireProject).is_err());
    }
}
