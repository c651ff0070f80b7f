//! One module per exposed tool. Each function takes already-healed,
//! already-typed arguments (healing happens at the MCP transport
//! boundary, see [`crate::healing`]) plus a [`crate::router::ToolContext`]
//! and returns the triple [`crate::router::dispatch`] expects: a
//! payload, any healing notes collected, and reminder candidates.

pub mod append_entry;
pub mod generate_doc_templates;
pub mod get_project;
pub mod health_check;
pub mod list_projects;
pub mod manage_docs;
pub mod query_entries;
pub mod read_recent;
pub mod rotate_log;
pub mod sentinel;
pub mod set_project;
