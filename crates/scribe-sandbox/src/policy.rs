//! Fixed allow/deny path policy.
//!
//! Checks run in a fixed order: NUL-byte rejection, encoded-traversal
//! rejection, symlink rejection on every existing ancestor, then a
//! realpath-based comparison against the allowed roots. Each step runs
//! before the next so that a symlink cannot be used to dodge the
//! realpath comparison, and an encoded traversal cannot reach the
//! filesystem at all.

use std::path::{Path, PathBuf};

use crate::error::{SandboxError, SandboxResult};

/// A fixed set of allowed roots a path must resolve within.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    allowed_roots: Vec<PathBuf>,
}

impl PathSandbox {
    /// Build a sandbox scoped to a single repository root.
    #[must_use]
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            allowed_roots: vec![repo_root.into()],
        }
    }

    /// Add another allowed root, e.g. a configured plugins directory that
    /// lives outside the repository.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.allowed_roots.push(root.into());
        self
    }

    /// Run the full check sequence, returning the realpath-resolved
    /// candidate path on success.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] at the first failing step.
    pub fn check(&self, candidate: &Path) -> SandboxResult<PathBuf> {
        reject_nul_byte(candidate)?;
        reject_encoded_traversal(candidate)?;
        reject_symlink_ancestors(candidate)?;
        self.resolve_within_roots(candidate)
    }

    fn resolve_within_roots(&self, candidate: &Path) -> SandboxResult<PathBuf> {
        let resolved = resolve_realpath(candidate)?;
        let canonical_roots: Vec<PathBuf> = self
            .allowed_roots
            .iter()
            .map(|r| r.canonicalize().unwrap_or_else(|_| r.clone()))
            .collect();
        if canonical_roots.iter().any(|root| resolved.starts_with(root)) {
            Ok(resolved)
        } else {
            Err(SandboxError::OutsideSandbox { path: resolved })
        }
    }
}

fn reject_nul_byte(path: &Path) -> SandboxResult<()> {
    let bytes = path.as_os_str().as_encoded_bytes();
    if bytes.contains(&0) {
        return Err(SandboxError::NulByte);
    }
    Ok(())
}

fn reject_encoded_traversal(path: &Path) -> SandboxResult<()> {
    let lossy = path.to_string_lossy().to_lowercase();
    for needle in ["..%2f", "..%5c", "%2e%2e/", "%2e%2e\\"] {
        if lossy.contains(needle) {
            return Err(SandboxError::EncodedTraversal(needle.to_string()));
        }
    }
    Ok(())
}

/// Walk every ancestor of `path` that exists on disk and reject if any of
/// them is a symlink. Components that do not yet exist (the create-doc
/// case) are skipped rather than treated as an error.
fn reject_symlink_ancestors(path: &Path) -> SandboxResult<()> {
    let mut ancestor_chain: Vec<&Path> = path.ancestors().collect();
    ancestor_chain.reverse();
    for ancestor in ancestor_chain {
        match std::fs::symlink_metadata(ancestor) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(SandboxError::Symlink {
                    path: ancestor.to_path_buf(),
                });
            },
            Ok(_) | Err(_) => continue,
        }
    }
    Ok(())
}

/// Resolve the deepest existing ancestor to its canonical form and rejoin
/// the remaining (not-yet-existing) components, so a target path that does
/// not exist yet can still be compared against the allowed roots.
fn resolve_realpath(path: &Path) -> SandboxResult<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();
    loop {
        if existing.as_os_str().is_empty() {
            return Err(SandboxError::Io("no existing ancestor found".into()));
        }
        match existing.canonicalize() {
            Ok(canonical) => {
                let mut resolved = canonical;
                for component in tail.into_iter().rev() {
                    resolved.push(component);
                }
                return Ok(resolved);
            },
            Err(_) => {
                if let Some(name) = existing.file_name() {
                    tail.push(name.to_os_string());
                }
                existing = existing
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(""));
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nul_byte() {
        let path = PathBuf::from("/tmp/foo\0bar");
        assert!(matches!(
            reject_nul_byte(&path),
            Err(SandboxError::NulByte)
        ));
    }

    #[test]
    fn rejects_encoded_traversal() {
        let path = PathBuf::from("/repo/..%2fetc/passwd");
        assert!(reject_encoded_traversal(&path).is_err());
    }

    #[test]
    fn allows_path_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::new(dir.path());
        let inside = dir.path().join("docs/dev_plans/plan.md");
        std::fs::create_dir_all(inside.parent().unwrap()).unwrap();
        std::fs::write(&inside, b"hi").unwrap();
        let resolved = sandbox.check(&inside).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn allows_not_yet_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        let sandbox = PathSandbox::new(dir.path());
        let target = dir.path().join("docs/new_file.md");
        let resolved = sandbox.check(&target).unwrap();
        assert!(resolved.ends_with("docs/new_file.md"));
    }

    #[test]
    fn rejects_path_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::new(dir.path());
        let outside = other.path().join("secret.md");
        std::fs::write(&outside, b"x").unwrap();
        assert!(matches!(
            sandbox.check(&outside),
            Err(SandboxError::OutsideSandbox { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let real_outside = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(real_outside.path(), &link).unwrap();
        let target = link.join("file.md");
        let sandbox = PathSandbox::new(dir.path());
        assert!(matches!(
            sandbox.check(&target),
            Err(SandboxError::Symlink { .. })
        ));
    }
}
