//! Convenience re-exports for downstream `scribe-*` crates.

pub use crate::context::{self, ExecutionContext, ExecutionContextBuilder, Mode};
pub use crate::error::{CoreError, CoreResult};
pub use crate::hash::{sha256_hex, sha256_hex_joined};
pub use crate::identity::AgentIdentity;
