//! Document-mutation engine: front-matter-aware editing, diff/patch,
//! table-of-contents generation, heading normalization, cross-link
//! validation, and checklist extraction, all wired through a single
//! transactional write contract.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod checklist;
pub mod crosslinks;
pub mod diff;
pub mod engine;
pub mod error;
pub mod frontmatter;
pub mod headers;
pub mod toc;

pub use engine::{DocEngine, DocOperation, DocTarget, MutationOutcome};
pub use error::{DocError, DocResult};
