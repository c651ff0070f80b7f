//! Shared primitives used by every other `scribe-*` crate: the execution
//! context carried through a single tool invocation, agent identity
//! resolution, hashing helpers, and the base error taxonomy.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(unsafe_code))]

pub mod context;
pub mod error;
pub mod hash;
pub mod identity;
pub mod prelude;

pub use context::{ExecutionContext, ExecutionContextBuilder, Mode};
pub use error::{CoreError, CoreResult};
pub use identity::AgentIdentity;
