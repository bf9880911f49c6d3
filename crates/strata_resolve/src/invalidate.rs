//! Translation of file-system change events into the precise set of
//! cached resolutions that must be re-resolved.
//!
//! The engine walks the cache once per event and tests each entry's
//! recorded dependency set (provenance, failed lookups, affecting
//! directories) against the changed path. It never resolves anything
//! and never touches the filesystem; over-invalidation defeats the
//! cache, under-invalidation is a silent correctness bug, so every rule
//! here mirrors one clause of the entry model's contract.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use strata_common::path::{is_at_or_under, is_under, normalize};

use crate::cache::ResolutionCache;
use crate::entry::{CandidateRank, ProbeKind};
use crate::events::{DirChange, FileChange, FsEvent, FsEventBatch};
use crate::key::ResolutionKey;

/// Classifies a path into the candidate rank a hit there would have,
/// from the configured extension sets and type roots.
///
/// Returns `None` for paths that can never satisfy a resolution (wrong
/// extension); such paths still invalidate through failed-lookup
/// membership, but cannot shadow an existing outcome.
#[derive(Clone, Debug)]
pub struct RankClassifier {
    source_extensions: Vec<String>,
    declaration_extensions: Vec<String>,
    type_roots: Vec<PathBuf>,
}

impl RankClassifier {
    /// Creates a classifier. `type_roots` must be absolute paths.
    pub fn new(
        source_extensions: &[String],
        declaration_extensions: &[String],
        type_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            source_extensions: source_extensions.to_vec(),
            declaration_extensions: declaration_extensions.to_vec(),
            type_roots: type_roots.into_iter().map(|p| normalize(&p)).collect(),
        }
    }

    /// The rank a candidate at `path` would resolve with, or `None` if
    /// the path cannot be a candidate.
    pub fn classify(&self, path: &Path) -> Option<CandidateRank> {
        let name = path.file_name()?.to_str()?;

        // Declaration extensions are multi-part (`d.ts`) and overlap
        // with source extensions (`ts`), so they must be checked first.
        if has_extension(name, &self.declaration_extensions) {
            if self.under_type_root(path) {
                return Some(CandidateRank::TypeRoot);
            }
            if in_package_dir(path) {
                return Some(CandidateRank::PackageExport);
            }
            return Some(CandidateRank::Declaration);
        }
        if has_extension(name, &self.source_extensions) {
            if in_package_dir(path) {
                return Some(CandidateRank::PackageExport);
            }
            return Some(CandidateRank::Implementation);
        }
        None
    }

    fn under_type_root(&self, path: &Path) -> bool {
        self.type_roots.iter().any(|root| is_under(path, root))
    }
}

fn has_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions
        .iter()
        .any(|ext| file_name.len() > ext.len() + 1 && file_name.ends_with(&format!(".{ext}")))
}

fn in_package_dir(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "node_modules")
}

/// Output of one invalidation pass: the deduplicated key set to
/// discard, or a wholesale invalidation when a configuration file
/// changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    /// Keys whose entries must be discarded and re-resolved.
    pub keys: BTreeSet<ResolutionKey>,
    /// The entire cache must be discarded; `keys` is empty when set.
    pub invalidate_all: bool,
}

impl InvalidationPlan {
    /// Whether the plan requires no work.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && !self.invalidate_all
    }
}

/// Consumes event batches and produces [`InvalidationPlan`]s against a
/// cache.
///
/// Stateless between calls: planning the same batch against the same
/// cache twice yields the same plan, which makes at-least-once event
/// delivery safe.
#[derive(Clone, Debug)]
pub struct InvalidationEngine {
    classifier: RankClassifier,
    config_files: BTreeSet<PathBuf>,
}

impl InvalidationEngine {
    /// Creates an engine. `config_files` are the paths whose *content*
    /// changes force wholesale invalidation (the project's own
    /// settings files).
    pub fn new(classifier: RankClassifier, config_files: BTreeSet<PathBuf>) -> Self {
        Self {
            classifier,
            config_files: config_files.iter().map(|p| normalize(p)).collect(),
        }
    }

    /// Maps an event batch to the set of keys to invalidate.
    pub fn plan(&self, cache: &ResolutionCache, batch: &FsEventBatch) -> InvalidationPlan {
        let mut plan = InvalidationPlan::default();
        for event in batch.iter() {
            match event {
                FsEvent::File {
                    change: FileChange::Created,
                    path,
                } => self.file_created(cache, path, &mut plan.keys),
                FsEvent::File {
                    change: FileChange::Deleted,
                    path,
                } => self.file_deleted(cache, path, &mut plan.keys),
                FsEvent::File {
                    change: FileChange::Modified,
                    path,
                } => {
                    // Content changes cannot alter which file resolution
                    // picks, except for the project's own configuration.
                    if self.config_files.contains(path) {
                        plan.invalidate_all = true;
                        break;
                    }
                }
                FsEvent::Directory {
                    change: DirChange::Created,
                    path,
                } => self.dir_created(cache, path, &mut plan.keys),
                FsEvent::Directory {
                    change: DirChange::Deleted,
                    path,
                } => self.dir_deleted(cache, path, &mut plan.keys),
                FsEvent::Subtree { root } => self.subtree_changed(cache, root, &mut plan.keys),
            }
        }
        if plan.invalidate_all {
            plan.keys.clear();
        }
        plan
    }

    /// A file now exists at `path`. Entries that previously probed that
    /// exact location and found nothing must re-resolve; entries that
    /// consulted a listing of an ancestor directory must re-resolve if
    /// the new file's rank can shadow their cached outcome.
    fn file_created(&self, cache: &ResolutionCache, path: &Path, keys: &mut BTreeSet<ResolutionKey>) {
        let new_rank = self.classifier.classify(path);
        for (key, entry) in cache.entries() {
            // The entry already resolves to this file; re-delivery of
            // the creation event must not churn it.
            if entry.outcome.resolved_path() == Some(path) {
                continue;
            }
            if entry.failed_lookups.contains(path) {
                keys.insert(key.clone());
                continue;
            }
            if let Some(rank) = new_rank {
                let shadows = match entry.outcome.resolved_rank() {
                    Some(cached) => rank.shadows(cached),
                    None => true,
                };
                if shadows && entry.has_listing_ancestor_of(path) {
                    keys.insert(key.clone());
                }
            }
        }
    }

    /// The file at `path` is gone. Only entries that *chose* it as
    /// their result are invalid; entries that merely recorded it as a
    /// failed lookup are unaffected by its deletion.
    fn file_deleted(&self, cache: &ResolutionCache, path: &Path, keys: &mut BTreeSet<ResolutionKey>) {
        for (key, entry) in cache.entries() {
            if entry.outcome.resolved_path() == Some(path) {
                keys.insert(key.clone());
            }
        }
    }

    /// A directory appeared (e.g. a package install). Treated as if
    /// every candidate file beneath it had been created individually.
    fn dir_created(&self, cache: &ResolutionCache, dir: &Path, keys: &mut BTreeSet<ResolutionKey>) {
        for (key, entry) in cache.entries() {
            if entry
                .affecting_dirs
                .iter()
                .any(|d| is_at_or_under(d, dir))
            {
                keys.insert(key.clone());
                continue;
            }
            if entry.failed_lookups.iter().any(|p| is_under(p, dir)) {
                keys.insert(key.clone());
                continue;
            }
            // A listing consulted at or under the new directory could
            // not have seen its contents.
            if entry
                .provenance
                .iter()
                .any(|probe| probe.probe == ProbeKind::DirListing && is_at_or_under(&probe.path, dir))
            {
                keys.insert(key.clone());
            }
        }
    }

    /// A directory vanished with everything beneath it.
    fn dir_deleted(&self, cache: &ResolutionCache, dir: &Path, keys: &mut BTreeSet<ResolutionKey>) {
        for (key, entry) in cache.entries() {
            if entry
                .affecting_dirs
                .iter()
                .any(|d| is_at_or_under(d, dir))
            {
                keys.insert(key.clone());
                continue;
            }
            if entry
                .outcome
                .resolved_path()
                .is_some_and(|p| is_at_or_under(p, dir))
            {
                keys.insert(key.clone());
            }
        }
    }

    /// An opaque notification: something under `root` changed.
    /// Conservatively invalidate every entry with any dependency in
    /// that subtree rather than guessing.
    fn subtree_changed(&self, cache: &ResolutionCache, root: &Path, keys: &mut BTreeSet<ResolutionKey>) {
        for (key, entry) in cache.entries() {
            if entry.touches_subtree(root) {
                keys.insert(key.clone());
            }
        }
    }
}
