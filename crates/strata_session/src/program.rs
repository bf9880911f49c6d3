//! The set of source files a session considers part of the program,
//! with their content fingerprints.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strata_common::path::normalize;
use strata_common::Fingerprint;

/// Fingerprinted program file set.
///
/// The session validates persisted snapshots against this set and
/// embeds it in every snapshot it writes. Fingerprints are supplied by
/// the host (the CLI hashes disk contents, tests hash in-memory
/// buffers), so the session itself performs no file reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFiles {
    files: BTreeMap<PathBuf, Fingerprint>,
}

impl ProgramFiles {
    /// Creates an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and fingerprints the given files from disk.
    ///
    /// Unreadable files are skipped; they will show up as missing when
    /// a snapshot is validated, which rejects the snapshot.
    pub fn from_disk(paths: &[PathBuf]) -> Self {
        let mut files = BTreeMap::new();
        for path in paths {
            if let Ok(content) = std::fs::read(path) {
                files.insert(normalize(path), Fingerprint::of_bytes(&content));
            }
        }
        Self { files }
    }

    /// Builds a file set from path/fingerprint pairs.
    pub fn from_fingerprints(
        entries: impl IntoIterator<Item = (PathBuf, Fingerprint)>,
    ) -> Self {
        Self {
            files: entries
                .into_iter()
                .map(|(path, fp)| (normalize(&path), fp))
                .collect(),
        }
    }

    /// Adds or refreshes one file's fingerprint.
    pub fn upsert(&mut self, path: &Path, fingerprint: Fingerprint) {
        self.files.insert(normalize(path), fingerprint);
    }

    /// Removes a file from the set. Returns `true` if it was present.
    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(&normalize(path)).is_some()
    }

    /// Whether the set contains `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    /// The fingerprint map, ordered by path.
    pub fn fingerprints(&self) -> &BTreeMap<PathBuf, Fingerprint> {
        &self.files
    }

    /// Number of files in the set.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
