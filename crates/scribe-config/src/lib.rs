//! Per-repository configuration: typed `RepoConfig`, repository-root
//! discovery, the config-file search order, and environment overrides.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(unsafe_code))]

pub mod discovery;
pub mod env;
pub mod error;
pub mod repo_config;

pub use discovery::{discover_or_create, ensure_config, find_repo_root, load_config};
pub use env::EnvOverrides;
pub use error::{ConfigError, ConfigResult};
pub use repo_config::{RepoConfig, StorageBackend};
