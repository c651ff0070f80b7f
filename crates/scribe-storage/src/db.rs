//! `SurrealDB` query engine interface.
//!
//! [`Database`] wraps a `SurrealDB` connection and provides the namespace
//! setup shared by both supported backends. In embedded mode it uses
//! `SurrealKV` as its storage engine; in server mode it speaks to a
//! standalone `SurrealDB` instance over `ws://`/`http://`.
//!
//! # Connection Strings
//!
//! | Mode | Connection | Backend |
//! |------|-----------|---------  |
//! | Embedded | `surrealkv://path/to/data` | `SurrealKV` |
//! | Embedded (test) | `mem://` | In-memory |
//! | Server | `ws://host:port` or `http://host:port` | networked `SurrealDB` |

use crate::error::{StorageError, StorageResult};

/// Re-export `SurrealDB` for direct query access when the typed API is not
/// sufficient.
pub use surrealdb;

const NAMESPACE: &str = "scribe";
const DATABASE: &str = "main";
const TEST_DATABASE: &str = "test";

/// `SurrealDB` query engine wrapper scoped to the `scribe` namespace.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to an embedded `SurrealDB` with `SurrealKV` storage, backed
    /// by the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        Self::connect(&endpoint, DATABASE).await
    }

    /// Connect to an in-memory `SurrealDB` (for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        Self::connect("mem://", TEST_DATABASE).await
    }

    /// Connect to a networked `SurrealDB` server at `url`
    /// (e.g. `ws://localhost:8000` or `http://localhost:8000`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_server(url: &str) -> StorageResult<Self> {
        Self::connect(url, DATABASE).await
    }

    async fn connect(endpoint: &str, database: &str) -> StorageResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e: surrealdb::Error| StorageError::Connection(e.to_string()))?;
        db.use_ns(NAMESPACE)
            .use_db(database)
            .await
            .map_err(|e: surrealdb::Error| StorageError::Connection(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// Get a reference to the underlying `SurrealDB` client, for direct
    /// `SurrealQL` queries.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
