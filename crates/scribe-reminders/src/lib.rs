//! Cooldown-aware, session-aware, priority-weighted reminder selection:
//! a standard catalog of coaching/hygiene/urgency reminders, a
//! persisted JSON cooldown cache, and the selection engine that ties
//! them to the durable reminder-history audit trail.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod catalog;
pub mod context;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod hash;

pub use catalog::{Category, Level, ReminderDefinition};
pub use context::ReminderContext;
pub use cooldown::CooldownCache;
pub use engine::{ReminderCandidate, ReminderEngine, SelectedReminder};
pub use error::{ReminderError, ReminderResult};
