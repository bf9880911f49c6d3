//! The cached outcome of a resolution and the provenance needed to
//! invalidate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use strata_common::path::{is_at_or_under, is_under, normalize};

/// Preference rank of a resolution candidate. Lower ranks win.
///
/// This is the fixed total order applied by resolvers when choosing
/// among candidates for one specifier, and by the invalidation engine
/// when deciding whether a newly created file can shadow a cached
/// result. The derived `Ord` is the preference order:
/// `Implementation < Declaration < PackageExport < TypeRoot`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CandidateRank {
    /// A source implementation file (`.ts`, `.tsx`).
    Implementation,
    /// A declaration-only file (`.d.ts`) next to the importer.
    Declaration,
    /// A file chosen through a package manifest in an external package.
    PackageExport,
    /// A declaration found under a configured types root.
    TypeRoot,
}

impl CandidateRank {
    /// Whether a candidate of this rank shadows (is preferred at least
    /// as much as) an outcome of rank `other`.
    pub fn shadows(self, other: CandidateRank) -> bool {
        self <= other
    }
}

/// How a file-system location was consulted during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeKind {
    /// A specific candidate file was checked for existence.
    File,
    /// A directory's listing was consulted.
    DirListing,
}

/// One file-system location consulted while producing a resolution,
/// recorded whether or not it existed at the time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedLocation {
    /// Normalized path of the consulted location.
    pub path: PathBuf,
    /// How the location was consulted.
    pub probe: ProbeKind,
    /// The preference rank a hit at this location would have had.
    pub rank: CandidateRank,
    /// Whether the location existed when consulted.
    pub existed: bool,
}

impl ProbedLocation {
    /// Records a file-existence probe.
    pub fn file(path: &Path, rank: CandidateRank, existed: bool) -> Self {
        Self {
            path: normalize(path),
            probe: ProbeKind::File,
            rank,
            existed,
        }
    }

    /// Records a consulted directory listing.
    pub fn dir_listing(path: &Path, rank: CandidateRank, existed: bool) -> Self {
        Self {
            path: normalize(path),
            probe: ProbeKind::DirListing,
            rank,
            existed,
        }
    }
}

/// The file a specifier resolved to, plus discriminators the compiler
/// needs when consuming the resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Normalized absolute path of the chosen file.
    pub path: PathBuf,
    /// Preference rank of the chosen candidate.
    pub rank: CandidateRank,
    /// The target lives in an external package directory.
    pub external_package: bool,
    /// The target is declaration-only (ambient types, no emitted code).
    pub declaration_only: bool,
}

/// Outcome of a completed resolution.
///
/// `NotFound` is a first-class cached value: it records that the
/// resolver ran and determined no candidate exists. It is distinct from
/// "never looked up" and must only be retried after an invalidation
/// event, never on a mere cache re-read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The specifier resolved to a concrete file.
    Resolved(ResolvedTarget),
    /// The resolver completed and found no candidate.
    NotFound,
}

impl Outcome {
    /// Whether the outcome is a concrete file.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Outcome::Resolved(_))
    }

    /// The resolved path, if any.
    pub fn resolved_path(&self) -> Option<&Path> {
        match self {
            Outcome::Resolved(target) => Some(&target.path),
            Outcome::NotFound => None,
        }
    }

    /// The resolved candidate's rank, if any.
    pub fn resolved_rank(&self) -> Option<CandidateRank> {
        match self {
            Outcome::Resolved(target) => Some(target.rank),
            Outcome::NotFound => None,
        }
    }
}

/// What a [`SpecifierResolver`](crate::SpecifierResolver) returns: the
/// outcome plus everything consulted along the way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The outcome.
    pub outcome: Outcome,
    /// Every location consulted, in probe order.
    pub provenance: Vec<ProbedLocation>,
    /// Directories whose existence or absence affects the outcome
    /// (types roots, package directories).
    pub affecting_dirs: BTreeSet<PathBuf>,
}

impl Resolution {
    /// A "not found" resolution with the given provenance.
    pub fn not_found(provenance: Vec<ProbedLocation>, affecting_dirs: BTreeSet<PathBuf>) -> Self {
        Self {
            outcome: Outcome::NotFound,
            provenance,
            affecting_dirs,
        }
    }
}

/// A cached resolution: the outcome plus the dependency set used to
/// decide when it must be discarded.
///
/// Entries are replaced whole on re-resolution, never edited in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEntry {
    /// The cached outcome.
    pub outcome: Outcome,
    /// Every location consulted while producing the outcome.
    pub provenance: Vec<ProbedLocation>,
    /// The provenance subset that did not exist at resolution time. A
    /// later creation at one of these paths is the most common
    /// invalidation trigger.
    pub failed_lookups: BTreeSet<PathBuf>,
    /// Directories whose existence or absence affects the outcome.
    pub affecting_dirs: BTreeSet<PathBuf>,
}

impl ResolutionEntry {
    /// Builds an entry from a freshly produced [`Resolution`], deriving
    /// the failed-lookup set from the probes that found nothing.
    pub fn new(resolution: Resolution) -> Self {
        let failed_lookups = resolution
            .provenance
            .iter()
            .filter(|probe| !probe.existed)
            .map(|probe| probe.path.clone())
            .collect();
        Self {
            outcome: resolution.outcome,
            provenance: resolution.provenance,
            failed_lookups,
            affecting_dirs: resolution.affecting_dirs,
        }
    }

    /// Whether a consulted directory listing is a lexical ancestor of
    /// `path` (a file created at `path` became visible to that listing).
    pub fn has_listing_ancestor_of(&self, path: &Path) -> bool {
        self.provenance
            .iter()
            .any(|probe| probe.probe == ProbeKind::DirListing && is_under(path, &probe.path))
    }

    /// Whether any recorded dependency of this entry lies at or under
    /// `root`: a provenance location, the resolved target, or an
    /// affecting directory.
    pub fn touches_subtree(&self, root: &Path) -> bool {
        self.provenance
            .iter()
            .any(|probe| is_at_or_under(&probe.path, root))
            || self
                .outcome
                .resolved_path()
                .is_some_and(|p| is_at_or_under(p, root))
            || self
                .affecting_dirs
                .iter()
                .any(|dir| is_at_or_under(dir, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: &str, rank: CandidateRank) -> ResolvedTarget {
        ResolvedTarget {
            path: PathBuf::from(path),
            rank,
            external_package: false,
            declaration_only: rank != CandidateRank::Implementation,
        }
    }

    #[test]
    fn rank_preference_order() {
        assert!(CandidateRank::Implementation < CandidateRank::Declaration);
        assert!(CandidateRank::Declaration < CandidateRank::PackageExport);
        assert!(CandidateRank::PackageExport < CandidateRank::TypeRoot);
    }

    #[test]
    fn rank_shadows_at_or_above() {
        assert!(CandidateRank::Implementation.shadows(CandidateRank::Declaration));
        assert!(CandidateRank::Declaration.shadows(CandidateRank::Declaration));
        assert!(!CandidateRank::TypeRoot.shadows(CandidateRank::Implementation));
    }

    #[test]
    fn new_derives_failed_lookups() {
        let resolution = Resolution {
            outcome: Outcome::Resolved(target("/p/src/a.d.ts", CandidateRank::Declaration)),
            provenance: vec![
                ProbedLocation::file(Path::new("/p/src/a.ts"), CandidateRank::Implementation, false),
                ProbedLocation::file(Path::new("/p/src/a.tsx"), CandidateRank::Implementation, false),
                ProbedLocation::file(Path::new("/p/src/a.d.ts"), CandidateRank::Declaration, true),
            ],
            affecting_dirs: BTreeSet::new(),
        };
        let entry = ResolutionEntry::new(resolution);
        assert_eq!(entry.failed_lookups.len(), 2);
        assert!(entry.failed_lookups.contains(Path::new("/p/src/a.ts")));
        assert!(entry.failed_lookups.contains(Path::new("/p/src/a.tsx")));
        assert!(!entry.failed_lookups.contains(Path::new("/p/src/a.d.ts")));
    }

    #[test]
    fn not_found_is_not_resolved() {
        let entry = ResolutionEntry::new(Resolution::not_found(vec![], BTreeSet::new()));
        assert!(!entry.outcome.is_resolved());
        assert_eq!(entry.outcome.resolved_path(), None);
        assert_eq!(entry.outcome.resolved_rank(), None);
    }

    #[test]
    fn listing_ancestor_detection() {
        let resolution = Resolution::not_found(
            vec![ProbedLocation::dir_listing(
                Path::new("/p/src"),
                CandidateRank::Implementation,
                true,
            )],
            BTreeSet::new(),
        );
        let entry = ResolutionEntry::new(resolution);
        assert!(entry.has_listing_ancestor_of(Path::new("/p/src/new.ts")));
        assert!(entry.has_listing_ancestor_of(Path::new("/p/src/nested/new.ts")));
        assert!(!entry.has_listing_ancestor_of(Path::new("/p/lib/new.ts")));
    }

    #[test]
    fn touches_subtree_covers_all_dependency_kinds() {
        let mut affecting = BTreeSet::new();
        affecting.insert(PathBuf::from("/p/node_modules/@types"));
        let resolution = Resolution {
            outcome: Outcome::Resolved(target(
                "/p/node_modules/pkg/index.d.ts",
                CandidateRank::PackageExport,
            )),
            provenance: vec![ProbedLocation::file(
                Path::new("/p/node_modules/pkg/package.json"),
                CandidateRank::PackageExport,
                false,
            )],
            affecting_dirs: affecting,
        };
        let entry = ResolutionEntry::new(resolution);
        assert!(entry.touches_subtree(Path::new("/p/node_modules")));
        assert!(entry.touches_subtree(Path::new("/p/node_modules/pkg")));
        assert!(entry.touches_subtree(Path::new("/p/node_modules/@types")));
        assert!(!entry.touches_subtree(Path::new("/p/src")));
    }

    #[test]
    fn serde_roundtrip() {
        let resolution = Resolution {
            outcome: Outcome::Resolved(target("/p/src/a.ts", CandidateRank::Implementation)),
            provenance: vec![ProbedLocation::file(
                Path::new("/p/src/a.ts"),
                CandidateRank::Implementation,
                true,
            )],
            affecting_dirs: BTreeSet::new(),
        };
        let entry = ResolutionEntry::new(resolution);
        let json = serde_json::to_string(&entry).unwrap();
        let back: ResolutionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
