//! Deterministic entry IDs: a pure function of identity fields so that
//! replaying the same logical append yields the same ID.

use std::collections::BTreeMap;

use scribe_core::hash::sha256_hex_joined;

/// Length, in hex characters, of a rendered entry ID.
pub const ENTRY_ID_LEN: usize = 32;

/// Render metadata as sorted `k=v` pairs joined by `;`, the exact
/// representation folded into the entry-ID hash input.
#[must_use]
pub fn render_sorted_meta(meta: &BTreeMap<String, String>) -> String {
    meta.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Compute the deterministic entry ID: the first 32 hex characters of the
/// SHA-256 of `repo_slug|project_slug|normalized_timestamp|agent|message|sorted_meta`.
#[must_use]
pub fn entry_id(
    repo_slug: &str,
    project_slug: &str,
    normalized_timestamp: &str,
    agent: &str,
    message: &str,
    meta: &BTreeMap<String, String>,
) -> String {
    let sorted_meta = render_sorted_meta(meta);
    let full = sha256_hex_joined(&[
        repo_slug,
        project_slug,
        normalized_timestamp,
        agent,
        message,
        &sorted_meta,
    ]);
    full[..ENTRY_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let mut meta = BTreeMap::new();
        meta.insert("foo".to_string(), "bar".to_string());
        let a = entry_id("demo", "demo", "2025-12-17 02:38:42 UTC", "Codex", "Smoke test", &meta);
        let b = entry_id("demo", "demo", "2025-12-17 02:38:42 UTC", "Codex", "Smoke test", &meta);
        assert_eq!(a, b);
        assert_eq!(a.len(), ENTRY_ID_LEN);
    }

    #[test]
    fn differs_on_message_change() {
        let meta = BTreeMap::new();
        let a = entry_id("demo", "demo", "2025-12-17 02:38:42 UTC", "Codex", "Smoke test", &meta);
        let b = entry_id("demo", "demo", "2025-12-17 02:38:42 UTC", "Codex", "Other", &meta);
        assert_ne!(a, b);
    }
}
