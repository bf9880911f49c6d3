//! Serialize, load, and validate build-info artifacts.
//!
//! Validation is deliberately all-or-nothing. The artifact commits to
//! whole-snapshot validity: a fingerprint mismatch on one file must
//! reject everything, not just the entries that touch it, because
//! entries record where resolution *looked*, not what it *read*, and a
//! changed file can shadow resolutions that never probed it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strata_common::Fingerprint;
use strata_resolve::ResolutionCache;

use crate::artifact::{read_artifact, write_artifact};
use crate::error::{BuildInfoError, LoadRejection};
use crate::snapshot::Snapshot;

/// Captures and writes the current cache state to `path`, atomically.
pub fn write_snapshot(
    path: &Path,
    cache: &ResolutionCache,
    files: BTreeMap<PathBuf, Fingerprint>,
    config_fingerprint: Fingerprint,
    tool_version: &str,
) -> Result<(), BuildInfoError> {
    let snapshot = Snapshot::capture(cache, files, config_fingerprint);
    let payload = snapshot.encode().map_err(|e| BuildInfoError::Serialization {
        reason: e.to_string(),
    })?;
    write_artifact(path, &payload, tool_version)
}

/// Loads the snapshot stored at `path`, without validating it against
/// the current program.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, LoadRejection> {
    let payload = read_artifact(path)?;
    Snapshot::decode(&payload)
}

/// Validates a loaded snapshot against the current program and
/// rehydrates the resolution cache.
///
/// Fails closed: configuration drift, any changed or vanished
/// fingerprinted file, any current file the snapshot never saw, or a
/// discarded resolution section each reject the snapshot wholesale.
pub fn validate(
    snapshot: Snapshot,
    current_files: &BTreeMap<PathBuf, Fingerprint>,
    current_config_fingerprint: Fingerprint,
) -> Result<ResolutionCache, LoadRejection> {
    if snapshot.config_fingerprint != current_config_fingerprint {
        return Err(LoadRejection::ConfigChanged);
    }
    for (path, recorded) in &snapshot.files {
        match current_files.get(path) {
            Some(current) if current == recorded => {}
            _ => return Err(LoadRejection::FileChanged(path.clone())),
        }
    }
    if current_files.keys().any(|path| !snapshot.files.contains_key(path)) {
        return Err(LoadRejection::FileSetChanged);
    }
    match snapshot.resolutions {
        Some(entries) => Ok(ResolutionCache::from_entries(entries)),
        None => Err(LoadRejection::NoResolutions),
    }
}

/// Discards the persisted resolution section while keeping the file
/// fingerprints, rewriting the artifact in place.
///
/// Returns `true` if an artifact was rewritten, `false` if there was
/// nothing usable to clean.
pub fn clean_persisted_program(path: &Path, tool_version: &str) -> Result<bool, BuildInfoError> {
    let snapshot = match load_snapshot(path) {
        Ok(snapshot) => snapshot,
        // Nothing trustworthy on disk; leave it for the next full
        // build to overwrite.
        Err(_) => return Ok(false),
    };
    let cleaned = snapshot.without_resolutions();
    let payload = cleaned.encode().map_err(|e| BuildInfoError::Serialization {
        reason: e.to_string(),
    })?;
    write_artifact(path, &payload, tool_version)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use strata_resolve::{
        CandidateRank, Outcome, ProbedLocation, Resolution, ResolutionKey, ResolutionMode,
        ResolvedTarget, ResolverError, SpecifierResolver,
    };

    struct FixedResolver(PathBuf);

    impl SpecifierResolver for FixedResolver {
        fn resolve(&self, _key: &ResolutionKey) -> Result<Resolution, ResolverError> {
            Ok(Resolution {
                outcome: Outcome::Resolved(ResolvedTarget {
                    path: self.0.clone(),
                    rank: CandidateRank::Implementation,
                    external_package: false,
                    declaration_only: false,
                }),
                provenance: vec![ProbedLocation::file(
                    &self.0,
                    CandidateRank::Implementation,
                    true,
                )],
                affecting_dirs: Default::default(),
            })
        }
    }

    fn main_key() -> ResolutionKey {
        ResolutionKey::module("./util", Path::new("/p/src/main.ts"), ResolutionMode::Import)
    }

    fn populated_cache() -> ResolutionCache {
        let mut cache = ResolutionCache::new();
        cache
            .resolve_or_reuse(main_key(), &FixedResolver(PathBuf::from("/p/src/util.ts")))
            .unwrap();
        cache
    }

    fn program_files() -> BTreeMap<PathBuf, Fingerprint> {
        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from("/p/src/main.ts"),
            Fingerprint::of_str("import './util';"),
        );
        files.insert(
            PathBuf::from("/p/src/util.ts"),
            Fingerprint::of_str("export const u = 1;"),
        );
        files
    }

    #[test]
    fn write_load_validate_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let cache = populated_cache();
        let config_fp = Fingerprint::of_str("config");

        write_snapshot(&path, &cache, program_files(), config_fp, "0.1.0").unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        let rehydrated = validate(snapshot, &program_files(), config_fp).unwrap();

        // Same lookups yield the same results.
        assert_eq!(rehydrated.len(), cache.len());
        let entry = rehydrated.lookup(&main_key()).unwrap();
        assert_eq!(
            entry.outcome.resolved_path(),
            Some(Path::new("/p/src/util.ts"))
        );
    }

    #[test]
    fn config_change_rejects_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        write_snapshot(
            &path,
            &populated_cache(),
            program_files(),
            Fingerprint::of_str("config"),
            "0.1.0",
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        let result = validate(snapshot, &program_files(), Fingerprint::of_str("other config"));
        assert_eq!(result.err(), Some(LoadRejection::ConfigChanged));
    }

    #[test]
    fn changed_file_rejects_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let config_fp = Fingerprint::of_str("config");
        write_snapshot(&path, &populated_cache(), program_files(), config_fp, "0.1.0").unwrap();

        let mut current = program_files();
        current.insert(
            PathBuf::from("/p/src/util.ts"),
            Fingerprint::of_str("export const u = 2;"),
        );

        let snapshot = load_snapshot(&path).unwrap();
        let result = validate(snapshot, &current, config_fp);
        assert_eq!(
            result.err(),
            Some(LoadRejection::FileChanged(PathBuf::from("/p/src/util.ts")))
        );
    }

    #[test]
    fn missing_file_rejects_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let config_fp = Fingerprint::of_str("config");
        write_snapshot(&path, &populated_cache(), program_files(), config_fp, "0.1.0").unwrap();

        let mut current = program_files();
        current.remove(Path::new("/p/src/util.ts"));

        let snapshot = load_snapshot(&path).unwrap();
        let result = validate(snapshot, &current, config_fp);
        assert_eq!(
            result.err(),
            Some(LoadRejection::FileChanged(PathBuf::from("/p/src/util.ts")))
        );
    }

    #[test]
    fn new_file_rejects_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let config_fp = Fingerprint::of_str("config");
        write_snapshot(&path, &populated_cache(), program_files(), config_fp, "0.1.0").unwrap();

        let mut current = program_files();
        current.insert(
            PathBuf::from("/p/src/new.ts"),
            Fingerprint::of_str("export {};"),
        );

        let snapshot = load_snapshot(&path).unwrap();
        let result = validate(snapshot, &current, config_fp);
        assert_eq!(result.err(), Some(LoadRejection::FileSetChanged));
    }

    #[test]
    fn clean_persisted_program_keeps_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let config_fp = Fingerprint::of_str("config");
        write_snapshot(&path, &populated_cache(), program_files(), config_fp, "0.1.0").unwrap();

        assert!(clean_persisted_program(&path, "0.1.0").unwrap());

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.files, program_files());
        assert!(snapshot.resolutions.is_none());

        // A cleaned snapshot cannot seed a cache.
        let result = validate(snapshot, &program_files(), config_fp);
        assert_eq!(result.err(), Some(LoadRejection::NoResolutions));
    }

    #[test]
    fn clean_persisted_program_without_artifact_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.stb");
        assert!(!clean_persisted_program(&path, "0.1.0").unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_artifact_never_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildinfo.stb");
        let config_fp = Fingerprint::of_str("config");
        write_snapshot(&path, &populated_cache(), program_files(), config_fp, "0.1.0").unwrap();

        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        std::fs::write(&path, &raw).unwrap();

        assert!(load_snapshot(&path).is_err());
    }
}
