//! The resolution cache: a mapping from request identity to cached
//! outcome.
//!
//! The cache is owned by exactly one build session and mutated only
//! between invalidation cycles. It performs no I/O; resolution happens
//! through the [`SpecifierResolver`] collaborator, and persistence is
//! the codec's job.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use strata_common::path::normalize;

use crate::entry::ResolutionEntry;
use crate::error::ResolverError;
use crate::key::ResolutionKey;
use crate::resolver::SpecifierResolver;

/// Hit/miss accounting for one build cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups satisfied from a live entry.
    pub hits: u64,
    /// Lookups that called the external resolver.
    pub misses: u64,
}

/// Mapping from [`ResolutionKey`] to [`ResolutionEntry`], owning entry
/// lifecycle.
///
/// A present entry is trustworthy by construction: the invalidation
/// engine removes entries whose provenance has drifted before the next
/// resolution round begins. A `NotFound` entry is just as live as a
/// resolved one: it is returned on reuse and is only retried after an
/// invalidation event.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<ResolutionKey, ResolutionEntry>,
    stats: CacheStats,
}

impl ResolutionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cache from persisted entries (used by the codec when
    /// rehydrating a validated snapshot).
    pub fn from_entries(entries: impl IntoIterator<Item = (ResolutionKey, ResolutionEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            stats: CacheStats::default(),
        }
    }

    /// Pure read: the live entry for `key`, if any.
    pub fn lookup(&self, key: &ResolutionKey) -> Option<&ResolutionEntry> {
        self.entries.get(key)
    }

    /// Returns the live entry for `key`, calling `resolver` and storing
    /// the result if there is none.
    ///
    /// A resolver error leaves the cache unchanged: transient failures
    /// are never recorded as negative outcomes.
    pub fn resolve_or_reuse<R: SpecifierResolver>(
        &mut self,
        key: ResolutionKey,
        resolver: &R,
    ) -> Result<&ResolutionEntry, ResolverError> {
        if self.entries.contains_key(&key) {
            self.stats.hits += 1;
            return Ok(&self.entries[&key]);
        }
        let resolution = resolver.resolve(&key)?;
        self.stats.misses += 1;
        Ok(self
            .entries
            .entry(key)
            .or_insert_with(|| ResolutionEntry::new(resolution)))
    }

    /// Inserts or replaces an entry wholesale.
    pub fn insert(&mut self, key: ResolutionKey, entry: ResolutionEntry) {
        self.entries.insert(key, entry);
    }

    /// Removes the entries for `keys`; subsequent `resolve_or_reuse`
    /// calls for them will re-resolve. Returns how many entries were
    /// actually removed.
    pub fn invalidate(&mut self, keys: &BTreeSet<ResolutionKey>) -> usize {
        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Drops every entry. Used when the compiler configuration changes,
    /// since provenance tracking cannot account for configuration
    /// deltas.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry keyed by `containing_file` (the file left the
    /// program). Returns how many entries were removed.
    pub fn remove_containing_file(&mut self, containing_file: &Path) -> usize {
        let containing_file = normalize(containing_file);
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.containing_file != containing_file);
        before - self.entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates live entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = (&ResolutionKey, &ResolutionEntry)> {
        self.entries.iter()
    }

    /// All live entries in key order, for deterministic snapshots.
    pub fn sorted_entries(&self) -> Vec<(ResolutionKey, ResolutionEntry)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }

    /// Hit/miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{CandidateRank, Outcome, ProbedLocation, Resolution, ResolvedTarget};
    use crate::key::ResolutionMode;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    /// Test resolver backed by a fixed table, counting calls.
    struct TableResolver {
        table: HashMap<ResolutionKey, Resolution>,
        calls: RefCell<u64>,
        fail_next: RefCell<bool>,
    }

    impl TableResolver {
        fn new() -> Self {
            Self {
                table: HashMap::new(),
                calls: RefCell::new(0),
                fail_next: RefCell::new(false),
            }
        }

        fn with(mut self, key: ResolutionKey, resolution: Resolution) -> Self {
            self.table.insert(key, resolution);
            self
        }

        fn calls(&self) -> u64 {
            *self.calls.borrow()
        }
    }

    impl SpecifierResolver for TableResolver {
        fn resolve(&self, key: &ResolutionKey) -> Result<Resolution, ResolverError> {
            *self.calls.borrow_mut() += 1;
            if self.fail_next.replace(false) {
                return Err(ResolverError::Io {
                    path: key.containing_file.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged"),
                });
            }
            Ok(self
                .table
                .get(key)
                .cloned()
                .unwrap_or_else(|| Resolution::not_found(vec![], BTreeSet::new())))
        }
    }

    fn key(specifier: &str) -> ResolutionKey {
        ResolutionKey::module(
            specifier,
            Path::new("/proj/src/main.ts"),
            ResolutionMode::Import,
        )
    }

    fn resolved(path: &str) -> Resolution {
        Resolution {
            outcome: Outcome::Resolved(ResolvedTarget {
                path: PathBuf::from(path),
                rank: CandidateRank::Implementation,
                external_package: false,
                declaration_only: false,
            }),
            provenance: vec![ProbedLocation::file(
                Path::new(path),
                CandidateRank::Implementation,
                true,
            )],
            affecting_dirs: BTreeSet::new(),
        }
    }

    #[test]
    fn miss_then_hit() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        let mut cache = ResolutionCache::new();

        let entry = cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        assert_eq!(
            entry.outcome.resolved_path(),
            Some(Path::new("/proj/src/util.ts"))
        );
        assert_eq!(resolver.calls(), 1);

        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        assert_eq!(resolver.calls(), 1, "second lookup must not re-resolve");
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn lookup_is_pure() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        let mut cache = ResolutionCache::new();
        assert!(cache.lookup(&key("./util")).is_none());
        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        assert!(cache.lookup(&key("./util")).is_some());
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });
    }

    #[test]
    fn not_found_is_cached() {
        let resolver = TableResolver::new();
        let mut cache = ResolutionCache::new();

        let entry = cache.resolve_or_reuse(key("./missing"), &resolver).unwrap();
        assert_eq!(entry.outcome, Outcome::NotFound);
        assert_eq!(resolver.calls(), 1);

        // Negative outcome is reused, not retried.
        let entry = cache.resolve_or_reuse(key("./missing"), &resolver).unwrap();
        assert_eq!(entry.outcome, Outcome::NotFound);
        assert_eq!(resolver.calls(), 1);
    }

    #[test]
    fn resolver_failure_is_not_cached() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        *resolver.fail_next.borrow_mut() = true;
        let mut cache = ResolutionCache::new();

        let err = cache.resolve_or_reuse(key("./util"), &resolver).unwrap_err();
        assert!(matches!(err, ResolverError::Io { .. }));
        assert!(cache.is_empty(), "a transient failure must leave no entry");

        // Next attempt resolves normally.
        let entry = cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        assert!(entry.outcome.is_resolved());
        assert_eq!(resolver.calls(), 2);
    }

    #[test]
    fn invalidate_forces_re_resolution() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        let mut cache = ResolutionCache::new();
        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();

        let mut dirty = BTreeSet::new();
        dirty.insert(key("./util"));
        assert_eq!(cache.invalidate(&dirty), 1);
        assert!(cache.lookup(&key("./util")).is_none());

        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        assert_eq!(resolver.calls(), 2);
    }

    #[test]
    fn invalidate_unknown_key_is_harmless() {
        let mut cache = ResolutionCache::new();
        let mut dirty = BTreeSet::new();
        dirty.insert(key("./never-resolved"));
        assert_eq!(cache.invalidate(&dirty), 0);
    }

    #[test]
    fn invalidate_all_empties_the_cache() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        let mut cache = ResolutionCache::new();
        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();
        cache.resolve_or_reuse(key("./other"), &resolver).unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn remove_containing_file_drops_only_its_keys() {
        let resolver = TableResolver::new();
        let mut cache = ResolutionCache::new();
        cache.resolve_or_reuse(key("./a"), &resolver).unwrap();
        cache
            .resolve_or_reuse(
                ResolutionKey::module("./a", Path::new("/proj/src/other.ts"), ResolutionMode::Import),
                &resolver,
            )
            .unwrap();

        let removed = cache.remove_containing_file(Path::new("/proj/src/main.ts"));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sorted_entries_are_deterministic() {
        let resolver = TableResolver::new();
        let mut cache = ResolutionCache::new();
        cache.resolve_or_reuse(key("./b"), &resolver).unwrap();
        cache.resolve_or_reuse(key("./a"), &resolver).unwrap();

        let entries = cache.sorted_entries();
        assert_eq!(entries[0].0.specifier, "./a");
        assert_eq!(entries[1].0.specifier, "./b");
    }

    #[test]
    fn from_entries_rebuilds() {
        let resolver = TableResolver::new().with(key("./util"), resolved("/proj/src/util.ts"));
        let mut cache = ResolutionCache::new();
        cache.resolve_or_reuse(key("./util"), &resolver).unwrap();

        let rebuilt = ResolutionCache::from_entries(cache.sorted_entries());
        assert_eq!(rebuilt.len(), 1);
        assert!(rebuilt.lookup(&key("./util")).is_some());
        assert_eq!(rebuilt.stats(), CacheStats::default());
    }
}
