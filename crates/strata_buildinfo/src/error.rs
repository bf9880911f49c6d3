//! Error and rejection types for build-info persistence.

use std::path::PathBuf;

/// Errors that can occur while *writing* a build-info artifact.
///
/// Reads never produce these: a load that goes wrong in any way yields
/// a [`LoadRejection`] and the session falls back to a cold rebuild.
#[derive(Debug, thiserror::Error)]
pub enum BuildInfoError {
    /// An I/O error occurred while writing the artifact.
    #[error("build-info I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization error occurred while encoding the snapshot.
    #[error("build-info serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

/// Why a persisted artifact was rejected at load or validation time.
///
/// Every variant means the same thing to the session: no usable cache,
/// resolve from scratch. The distinctions exist for reporting and for
/// tests that pin down fail-closed behavior.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadRejection {
    /// No artifact exists at the configured path.
    #[error("no build-info artifact present")]
    Missing,

    /// The artifact exists but could not be read.
    #[error("build-info artifact unreadable")]
    Unreadable,

    /// The artifact is shorter than its own framing claims.
    #[error("build-info artifact truncated")]
    Truncated,

    /// The artifact does not start with the expected magic bytes.
    #[error("not a build-info artifact")]
    BadMagic,

    /// The artifact was written by an incompatible format version.
    #[error("build-info format version mismatch: expected {expected}, got {actual}")]
    FormatVersion {
        /// The version this build understands.
        expected: u32,
        /// The version found in the artifact.
        actual: u32,
    },

    /// The payload checksum does not match the header.
    #[error("build-info checksum mismatch")]
    ChecksumMismatch,

    /// The payload could not be decompressed or decoded.
    #[error("build-info payload corrupt: {0}")]
    Decode(String),

    /// The recorded configuration fingerprint differs from the current
    /// configuration.
    #[error("configuration changed since build-info was written")]
    ConfigChanged,

    /// A recorded source file's fingerprint differs from its current
    /// content, or the file is gone.
    #[error("source file changed since build-info was written: {0}")]
    FileChanged(PathBuf),

    /// The current program contains files the artifact never saw.
    #[error("program file set changed since build-info was written")]
    FileSetChanged,

    /// The artifact is valid but its resolution section was discarded.
    #[error("build-info has no persisted resolutions")]
    NoResolutions,
}
