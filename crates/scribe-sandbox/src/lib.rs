//! Filesystem sandboxing: a fixed allow/deny path policy composed with a
//! per-repository permission checker that gates individual operations.
//!
//! Unlike a workspace-boundary checker with approval escalation, this
//! sandbox is deliberately binary: a path is either inside the allowed
//! roots or it is rejected outright. There is no `RequiresApproval` state.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod permissions;
pub mod policy;
pub mod safe_op;

pub use error::{SandboxError, SandboxResult};
pub use permissions::{Operation, PermissionChecker};
pub use policy::PathSandbox;
pub use safe_op::safe_file_operation;
