//! Low-level file operations shared by the logging and document engines:
//! advisory-locked append, atomic temp+rename writes, rotation with a
//! hash chain, and bounded backward tail reads.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod atomic;
pub mod error;
pub mod lock;
pub mod rotate;
pub mod tail;

pub use error::{FileIoError, FileIoResult};
