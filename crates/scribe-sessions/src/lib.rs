//! Session identity resolution and agent-scoped project context: the
//! `ExecutionContext`-adjacent layer that turns a transport session into a
//! stable identity and mediates `AgentProject`/`AgentEvent` state.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod events;
pub mod manager;
pub mod project_context;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use manager::SessionManager;
pub use project_context::{ProjectContext, ProjectPointer};
pub use state::{PersistedState, StateManager};
