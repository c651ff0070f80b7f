//! Composed entry point: path policy, then the operation-level gate.

use std::path::{Path, PathBuf};

use scribe_core::ExecutionContext;

use crate::error::SandboxResult;
use crate::permissions::{Operation, PermissionChecker};
use crate::policy::PathSandbox;

/// Check that `path` is safe to touch for `operation` under `context`.
///
/// Runs the full ordered path-policy check first, then the operation gate,
/// matching the order documented for the sandbox: a denied operation never
/// leaks information about whether the path itself would have been allowed.
///
/// # Errors
///
/// Returns the first failing [`crate::SandboxError`].
pub fn safe_file_operation(
    sandbox: &PathSandbox,
    permissions: &PermissionChecker,
    path: &Path,
    operation: Operation,
    _context: &ExecutionContext,
) -> SandboxResult<PathBuf> {
    let resolved = sandbox.check(path)?;
    permissions.check(operation)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{AgentIdentity, Mode};

    fn ctx(root: &Path) -> ExecutionContext {
        ExecutionContext::builder()
            .repo_root(root)
            .mode(Mode::Project)
            .transport_session_id("t-1")
            .agent_identity(AgentIdentity::new("codex", None))
            .intent("test")
            .build()
            .unwrap()
    }

    #[test]
    fn denies_on_operation_gate_even_if_path_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::new(dir.path());
        let permissions = PermissionChecker {
            allow_rotate: false,
            ..PermissionChecker::default()
        };
        let target = dir.path().join("progress.log");
        std::fs::write(&target, b"x").unwrap();
        let context = ctx(dir.path());
        let err = safe_file_operation(
            &sandbox,
            &permissions,
            &target,
            Operation::Rotate,
            &context,
        )
        .unwrap_err();
        assert!(matches!(err, crate::SandboxError::OperationDenied { .. }));
    }

    #[test]
    fn allows_when_both_checks_pass() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::new(dir.path());
        let permissions = PermissionChecker::default();
        let target = dir.path().join("progress.log");
        std::fs::write(&target, b"x").unwrap();
        let context = ctx(dir.path());
        assert!(
            safe_file_operation(&sandbox, &permissions, &target, Operation::Rotate, &context)
                .is_ok()
        );
    }
}
