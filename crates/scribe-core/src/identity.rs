//! Agent identity resolution.
//!
//! An [`AgentIdentity`] names which agent kind and model produced a log
//! entry or holds a project lease. Resolution order, cheapest first:
//! an explicit argument, then `SCRIBE_AGENT_KIND`/`SCRIBE_AGENT_MODEL`
//! (falling back to `CODEX_MODEL` for the model), then a configured
//! default, then the literal `"default"`.

use std::env;

/// Identifies the agent kind and model behind a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AgentIdentity {
    /// Short agent kind, e.g. `"claude-code"`, `"codex"`.
    pub kind: String,
    /// Model identifier, when known.
    pub model: Option<String>,
}

impl AgentIdentity {
    /// Build directly from known parts.
    #[must_use]
    pub fn new(kind: impl Into<String>, model: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            model,
        }
    }

    /// Resolve per the precedence order described above.
    #[must_use]
    pub fn resolve(explicit: Option<&str>, configured_default: Option<&str>) -> Self {
        if let Some(kind) = explicit {
            return Self::new(kind, env_model());
        }
        if let Ok(kind) = env::var("SCRIBE_AGENT_KIND") {
            if !kind.is_empty() {
                return Self::new(kind, env_model());
            }
        }
        if let Some(kind) = configured_default {
            if !kind.is_empty() {
                return Self::new(kind, env_model());
            }
        }
        Self::new("default", env_model())
    }

    /// Canonical `kind/model` or bare `kind` string for display and hashing.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.model {
            Some(model) => format!("{}/{}", self.kind, model),
            None => self.kind.clone(),
        }
    }
}

fn env_model() -> Option<String> {
    env::var("SCRIBE_AGENT_MODEL")
        .or_else(|_| env::var("CODEX_MODEL"))
        .ok()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_without_model() {
        let id = AgentIdentity::new("codex", None);
        assert_eq!(id.label(), "codex");
    }

    #[test]
    fn label_with_model() {
        let id = AgentIdentity::new("codex", Some("gpt-5".into()));
        assert_eq!(id.label(), "codex/gpt-5");
    }

    #[test]
    fn resolve_falls_back_to_default_literal() {
        // SAFETY (test-only): no other test in this process reads these vars
        // concurrently; scoped removal avoids leaking state across tests.
        unsafe {
            env::remove_var("SCRIBE_AGENT_KIND");
            env::remove_var("SCRIBE_AGENT_MODEL");
            env::remove_var("CODEX_MODEL");
        }
        let id = AgentIdentity::resolve(None, None);
        assert_eq!(id.kind, "default");
    }

    #[test]
    fn resolve_prefers_explicit() {
        let id = AgentIdentity::resolve(Some("claude-code"), Some("configured"));
        assert_eq!(id.kind, "claude-code");
    }
}
