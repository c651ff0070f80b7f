//! Canonical log-line format, deterministic entry IDs, stream metadata
//! requirements, and the append pipeline that ties them to storage and
//! locked file I/O.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod append;
pub mod error;
pub mod format;
pub mod id;
pub mod priority;
pub mod streams;

pub use append::{append_bulk, append_entry, AppendOutcome, AppendRequest};
pub use error::{LoggingError, LoggingResult};
pub use streams::Stream;
