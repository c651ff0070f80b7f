//! Thin re-export surface for audit-event reads, kept separate from
//! [`crate::project_context`] so tool implementations can depend on a
//! narrower interface.

pub use scribe_storage::models::{AgentEvent, AgentEventType};
