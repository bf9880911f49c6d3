//! The Strata resolution cache core.
//!
//! This crate owns the cached-resolution data model, the cache itself,
//! and the invalidation engine that maps file-system change events to
//! the set of cached lookups that can no longer be trusted. It does not
//! resolve anything: the surrounding compiler supplies a
//! [`SpecifierResolver`] and the cache only records and invalidates its
//! outputs.

#![warn(missing_docs)]

pub mod cache;
pub mod entry;
pub mod error;
pub mod events;
pub mod invalidate;
pub mod key;
pub mod resolver;

pub use cache::{CacheStats, ResolutionCache};
pub use entry::{
    CandidateRank, Outcome, ProbeKind, ProbedLocation, Resolution, ResolutionEntry,
    ResolvedTarget,
};
pub use error::ResolverError;
pub use events::{DirChange, FileChange, FsEvent, FsEventBatch};
pub use invalidate::{InvalidationEngine, InvalidationPlan, RankClassifier};
pub use key::{ResolutionKey, ResolutionKind, ResolutionMode};
pub use resolver::SpecifierResolver;
