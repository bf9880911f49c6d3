//! The incremental build cycle that owns a resolution cache.
//!
//! One [`BuildSession`] drives one project's cache through the
//! cold-start, validation, and steady-state phases, brokering between
//! the persisted build-info artifact, the invalidation engine, and the
//! host-supplied resolver. Sessions are single-writer: all mutation
//! happens through `&mut self` between discrete units of work.

#![warn(missing_docs)]

pub mod error;
pub mod program;
pub mod session;

pub use error::SessionError;
pub use program::ProgramFiles;
pub use session::{BuildSession, SessionState};
