//! Error type for build-session operations.

use strata_buildinfo::BuildInfoError;
use strata_resolve::ResolverError;

/// Errors surfaced by a [`BuildSession`](crate::BuildSession).
///
/// None of these are fatal to the host: a resolver failure leaves the
/// affected keys pending for the next reconcile, and a persistence
/// failure leaves the previous on-disk artifact intact.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The external resolver failed (distinct from "not found").
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Writing the build-info artifact failed.
    #[error(transparent)]
    BuildInfo(#[from] BuildInfoError),
}
