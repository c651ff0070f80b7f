//! SHA-256 hashing helpers shared by entry IDs, agent-identity hashes,
//! reminder hashes, and document before/after content hashes.

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes to a lowercase hex string.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash a sequence of `|`-joined fields, matching the deterministic entry-id
/// and agent-identity-hash grammars used across the workspace.
#[must_use]
pub fn sha256_hex_joined(fields: &[&str]) -> String {
    sha256_hex(fields.join("|").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_output_is_64_chars() {
        let h = sha256_hex(b"hello");
        assert_eq!(h.len(), 64);
    }

    #[test]
    fn joined_is_deterministic() {
        let a = sha256_hex_joined(&["repo", "proj", "123", "agent", "msg"]);
        let b = sha256_hex_joined(&["repo", "proj", "123", "agent", "msg"]);
        assert_eq!(a, b);
    }

    #[test]
    fn joined_is_order_sensitive() {
        let a = sha256_hex_joined(&["a", "b"]);
        let b = sha256_hex_joined(&["b", "a"]);
        assert_ne!(a, b);
    }
}
