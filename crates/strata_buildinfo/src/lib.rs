//! Build-info persistence for the Strata resolution cache.
//!
//! A build session's resolution cache survives process restarts as a
//! single versioned artifact: a validated binary header followed by a
//! compressed snapshot of every cached resolution plus the file and
//! configuration fingerprints needed to decide, on the next cold
//! start, whether any of it can still be trusted. Validation is
//! all-or-nothing: one stale fingerprint rejects the whole snapshot.

#![warn(missing_docs)]

pub mod artifact;
pub mod codec;
pub mod error;
pub mod snapshot;

pub use codec::{clean_persisted_program, load_snapshot, validate, write_snapshot};
pub use error::{BuildInfoError, LoadRejection};
pub use snapshot::Snapshot;
