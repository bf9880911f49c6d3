//! The logical content of a persisted build-info artifact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use strata_common::Fingerprint;
use strata_resolve::{ResolutionCache, ResolutionEntry, ResolutionKey};

use crate::error::LoadRejection;

/// A whole-cache snapshot plus the metadata needed to validate reuse.
///
/// Collections are ordered so encoding the same logical state always
/// produces the same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Fingerprint of the resolution-affecting configuration in effect
    /// when the snapshot was taken.
    pub config_fingerprint: Fingerprint,

    /// Content fingerprint of every source file in the program.
    pub files: BTreeMap<PathBuf, Fingerprint>,

    /// Every cached resolution, in key order. `None` when the
    /// resolution section was discarded by `clean_persisted_program`
    /// while keeping the rest of the incremental state.
    pub resolutions: Option<Vec<(ResolutionKey, ResolutionEntry)>>,
}

impl Snapshot {
    /// Captures the current cache state for persistence.
    pub fn capture(
        cache: &ResolutionCache,
        files: BTreeMap<PathBuf, Fingerprint>,
        config_fingerprint: Fingerprint,
    ) -> Self {
        Self {
            config_fingerprint,
            files,
            resolutions: Some(cache.sorted_entries()),
        }
    }

    /// Returns this snapshot with the resolution section discarded.
    pub fn without_resolutions(mut self) -> Self {
        self.resolutions = None;
        self
    }

    /// Encodes the snapshot to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
    }

    /// Decodes a snapshot from artifact payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadRejection> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| LoadRejection::Decode(e.to_string()))
    }
}
