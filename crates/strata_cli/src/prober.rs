//! A disk-probing [`SpecifierResolver`] for the CLI.
//!
//! The cache core treats resolution as an external collaborator; this
//! is the implementation the `strata` binary supplies. It probes
//! candidate files in the fixed preference order (implementation
//! extensions, declaration extensions, package exports, type roots)
//! and records every consulted location so the invalidation engine has
//! full provenance to work with.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use strata_common::path::normalize;
use strata_config::{ProjectConfig, ResolutionStrategy};
use strata_resolve::{
    CandidateRank, Outcome, ProbedLocation, Resolution, ResolutionKey, ResolutionKind,
    ResolvedTarget, ResolverError, SpecifierResolver,
};

/// Resolves specifiers against the real filesystem.
pub struct DiskProber {
    project_root: PathBuf,
    strategy: ResolutionStrategy,
    source_extensions: Vec<String>,
    declaration_extensions: Vec<String>,
    type_roots: Vec<PathBuf>,
    paths: Vec<(String, Vec<String>)>,
}

impl DiskProber {
    /// Builds a prober from a project's configuration.
    pub fn from_config(project_dir: &Path, config: &ProjectConfig) -> Self {
        Self {
            project_root: project_dir.to_path_buf(),
            strategy: config.resolution.strategy,
            source_extensions: config.resolution.source_extensions.clone(),
            declaration_extensions: config.resolution.declaration_extensions.clone(),
            type_roots: config
                .resolution
                .type_roots
                .iter()
                .map(|root| project_dir.join(root))
                .collect(),
            paths: config
                .resolution
                .paths
                .iter()
                .map(|(alias, candidates)| (alias.clone(), candidates.clone()))
                .collect(),
        }
    }

    /// Probes one candidate file, recording the attempt.
    fn probe(
        &self,
        candidate: PathBuf,
        rank: CandidateRank,
        provenance: &mut Vec<ProbedLocation>,
    ) -> Option<PathBuf> {
        let candidate = normalize(&candidate);
        let existed = candidate.is_file();
        provenance.push(ProbedLocation::file(&candidate, rank, existed));
        existed.then_some(candidate)
    }

    /// Probes `base` with every configured extension, implementation
    /// extensions first.
    fn probe_with_extensions(
        &self,
        base: &Path,
        package: bool,
        provenance: &mut Vec<ProbedLocation>,
    ) -> Option<ResolvedTarget> {
        let ranked = self
            .source_extensions
            .iter()
            .map(|ext| (ext, false))
            .chain(self.declaration_extensions.iter().map(|ext| (ext, true)))
            .collect::<Vec<_>>();
        for (ext, declaration) in ranked {
            let rank = match (package, declaration) {
                (true, _) => CandidateRank::PackageExport,
                (false, true) => CandidateRank::Declaration,
                (false, false) => CandidateRank::Implementation,
            };
            let candidate = PathBuf::from(format!("{}.{ext}", base.display()));
            if let Some(path) = self.probe(candidate, rank, provenance) {
                return Some(ResolvedTarget {
                    path,
                    rank,
                    external_package: package,
                    declaration_only: declaration,
                });
            }
        }
        None
    }

    /// Substitutes `specifier` into the configured path mappings,
    /// yielding project-relative candidate bases.
    fn mapped_bases(&self, specifier: &str) -> Vec<PathBuf> {
        let mut bases = Vec::new();
        for (alias, candidates) in &self.paths {
            let captured = match alias.split_once('*') {
                Some((prefix, suffix)) => {
                    if specifier.starts_with(prefix) && specifier.ends_with(suffix) {
                        Some(&specifier[prefix.len()..specifier.len() - suffix.len()])
                    } else {
                        None
                    }
                }
                None => (specifier == alias).then_some(""),
            };
            if let Some(captured) = captured {
                for candidate in candidates {
                    bases.push(self.project_root.join(candidate.replacen('*', captured, 1)));
                }
            }
        }
        bases
    }

    fn resolve_module(&self, key: &ResolutionKey) -> Resolution {
        let mut provenance = Vec::new();

        if key.specifier.starts_with('.') {
            let base = key
                .containing_file
                .parent()
                .unwrap_or(&self.project_root)
                .join(&key.specifier);
            let base = normalize(&base);
            if let Some(target) = self.probe_with_extensions(&base, false, &mut provenance) {
                return resolved(target, provenance, BTreeSet::new());
            }
            return Resolution::not_found(provenance, BTreeSet::new());
        }

        // Path mappings take precedence over strategy lookup.
        for base in self.mapped_bases(&key.specifier) {
            if let Some(target) = self.probe_with_extensions(&base, false, &mut provenance) {
                return resolved(target, provenance, BTreeSet::new());
            }
        }

        match self.strategy {
            ResolutionStrategy::Node => {
                let node_modules = self.project_root.join("node_modules");
                let mut affecting = BTreeSet::new();
                affecting.insert(node_modules.clone());

                let package_dir = node_modules.join(&key.specifier);
                affecting.insert(package_dir.clone());
                if let Some(target) =
                    self.probe_with_extensions(&package_dir.join("index"), true, &mut provenance)
                {
                    return resolved(target, provenance, affecting);
                }
                Resolution::not_found(provenance, affecting)
            }
            ResolutionStrategy::Classic => {
                let base = self.project_root.join(&key.specifier);
                if let Some(target) = self.probe_with_extensions(&base, false, &mut provenance) {
                    return resolved(target, provenance, BTreeSet::new());
                }
                Resolution::not_found(provenance, BTreeSet::new())
            }
        }
    }

    fn resolve_type_reference(&self, key: &ResolutionKey) -> Resolution {
        let mut provenance = Vec::new();
        let mut affecting: BTreeSet<PathBuf> = self.type_roots.iter().cloned().collect();

        for root in &self.type_roots {
            let package_dir = root.join(&key.specifier);
            affecting.insert(package_dir.clone());
            let candidate = package_dir.join("index.d.ts");
            if let Some(path) = self.probe(candidate, CandidateRank::TypeRoot, &mut provenance) {
                return resolved(
                    ResolvedTarget {
                        path,
                        rank: CandidateRank::TypeRoot,
                        external_package: true,
                        declaration_only: true,
                    },
                    provenance,
                    affecting,
                );
            }
        }
        Resolution::not_found(provenance, affecting)
    }
}

fn resolved(
    target: ResolvedTarget,
    provenance: Vec<ProbedLocation>,
    affecting_dirs: BTreeSet<PathBuf>,
) -> Resolution {
    Resolution {
        outcome: Outcome::Resolved(target),
        provenance,
        affecting_dirs,
    }
}

impl SpecifierResolver for DiskProber {
    fn resolve(&self, key: &ResolutionKey) -> Result<Resolution, ResolverError> {
        match key.kind {
            ResolutionKind::Module => Ok(self.resolve_module(key)),
            ResolutionKind::TypeReference | ResolutionKind::LibraryReference => {
                Ok(self.resolve_type_reference(key))
            }
        }
    }
}
