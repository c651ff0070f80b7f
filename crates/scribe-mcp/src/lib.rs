//! Stdio MCP server exposing the progress-logging, document-mutation,
//! and sentinel-mode tool surface to concurrent autonomous agents.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod params;
mod server;

pub use server::ScribeServer;
