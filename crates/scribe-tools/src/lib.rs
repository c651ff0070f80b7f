//! Tool bodies and the invocation pipeline that wraps them: parameter
//! healing, execution-context resolution, response-size limiting, and
//! reminder attachment.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entry_limit;
pub mod error;
pub mod healing;
pub mod router;
pub mod tools;

pub use error::{ErrorKind, ToolError, ToolResult};
pub use router::{dispatch, CallRequest, ToolContext, ToolResponse};
