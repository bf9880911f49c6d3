//! Shared foundational types for the Strata resolution cache.
//!
//! This crate provides content fingerprinting and the lexical path
//! utilities used by cache invalidation. It deliberately contains no I/O
//! beyond reading bytes handed to it, so everything here is usable from
//! pure, filesystem-free unit tests.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod path;

pub use fingerprint::Fingerprint;
pub use path::{is_under, normalize};
