//! `SurrealDB`-backed storage for projects, entries, sessions, and the
//! other durable tables that back the tool layer.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod db;
pub mod error;
pub mod models;
pub mod queries;
pub mod schema;

pub use db::Database;
pub use error::{StorageError, StorageResult};
