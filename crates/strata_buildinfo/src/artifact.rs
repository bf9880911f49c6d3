//! On-disk framing of the build-info artifact.
//!
//! Layout: a 4-byte little-endian header length, a bincode-encoded
//! [`ArtifactHeader`], then the gzip-compressed snapshot payload. The
//! header carries magic bytes, a format version, and a checksum of the
//! compressed payload, so a torn or tampered file is detected before
//! any of its content is believed. Writes go to a sibling temp file
//! first and are renamed into place, so a crash mid-write leaves the
//! previous artifact intact.

use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use strata_common::Fingerprint;

use crate::error::{BuildInfoError, LoadRejection};

/// Magic bytes identifying a Strata build-info artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"STBI";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload encoding.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every build-info artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"STBI"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Strata version that produced this artifact.
    pub tool_version: String,

    /// Fingerprint of the compressed payload.
    pub checksum: Fingerprint,
}

/// Writes `payload` to `path` with framing, compression, and an atomic
/// rename.
pub fn write_artifact(path: &Path, payload: &[u8], tool_version: &str) -> Result<(), BuildInfoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| BuildInfoError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).map_err(|e| BuildInfoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let compressed = encoder.finish().map_err(|e| BuildInfoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        tool_version: tool_version.to_string(),
        checksum: Fingerprint::of_bytes(&compressed),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| BuildInfoError::Serialization {
            reason: e.to_string(),
        })?;

    let mut output = Vec::with_capacity(4 + header_bytes.len() + compressed.len());
    output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&compressed);

    // Write-to-temp-then-rename: a crash mid-write must never leave a
    // torn artifact that could be trusted on the next start.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &output).map_err(|e| BuildInfoError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| BuildInfoError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads and validates the artifact at `path`, returning the
/// decompressed payload.
///
/// Fail-safe: every way this can go wrong maps to a [`LoadRejection`].
pub fn read_artifact(path: &Path) -> Result<Vec<u8>, LoadRejection> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(LoadRejection::Missing),
        Err(_) => return Err(LoadRejection::Unreadable),
    };

    if raw.len() < 4 {
        return Err(LoadRejection::Truncated);
    }
    let header_len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    if raw.len() < 4 + header_len {
        return Err(LoadRejection::Truncated);
    }

    let header: ArtifactHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|e| LoadRejection::Decode(e.to_string()))?
            .0;

    if header.magic != ARTIFACT_MAGIC {
        return Err(LoadRejection::BadMagic);
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(LoadRejection::FormatVersion {
            expected: ARTIFACT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let compressed = &raw[4 + header_len..];
    if Fingerprint::of_bytes(compressed) != header.checksum {
        return Err(LoadRejection::ChecksumMismatch);
    }

    let mut payload = Vec::new();
    GzDecoder::new(compressed)
        .read_to_end(&mut payload)
        .map_err(|e| LoadRejection::Decode(e.to_string()))?;
    Ok(payload)
}
