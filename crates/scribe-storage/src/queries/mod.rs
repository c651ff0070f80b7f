//! Parameterized queries against each table in the schema.

pub mod agent_events;
pub mod agent_projects;
pub mod doc_changes;
pub mod entries;
pub mod metrics;
pub mod projects;
pub mod reminders;
pub mod sentinel;
pub mod sessions;
