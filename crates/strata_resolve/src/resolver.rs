//! The resolution collaborator seam.

use crate::entry::Resolution;
use crate::error::ResolverError;
use crate::key::ResolutionKey;

/// Resolves one specifier to a file, supplied by the surrounding
/// compiler.
///
/// The cache core never walks directories or reads package manifests
/// itself; it calls this trait on a cache miss and records whatever
/// comes back. Implementations must report *everything* they consulted
/// in the returned [`Resolution`]'s provenance; an omitted probe is an
/// invalidation the cache will never see.
///
/// A completed lookup that finds nothing is `Ok` with
/// [`Outcome::NotFound`](crate::Outcome::NotFound); `Err` is reserved
/// for failures where the resolver could not finish, and is never
/// cached.
pub trait SpecifierResolver {
    /// Resolves `key`, returning the outcome and full provenance.
    fn resolve(&self, key: &ResolutionKey) -> Result<Resolution, ResolverError>;
}

impl<T: SpecifierResolver + ?Sized> SpecifierResolver for &T {
    fn resolve(&self, key: &ResolutionKey) -> Result<Resolution, ResolverError> {
        (**self).resolve(key)
    }
}
