//! Error types for the resolution cache.

use std::path::PathBuf;

/// A failure reported by the external resolver, distinct from a
/// completed "not found" outcome.
///
/// Failures are transient (an I/O error while probing, an interrupted
/// read) and must never be cached: caching one would poison the cache
/// with a result the resolver never actually produced. The cache
/// propagates these to the build cycle and leaves no entry behind.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// An I/O error occurred while the resolver probed the filesystem.
    #[error("resolver I/O error at {path}: {source}")]
    Io {
        /// The path being probed when the error occurred.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The host interrupted resolution (a newer edit superseded this
    /// build cycle).
    #[error("resolution interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_display_includes_path() {
        let err = ResolverError::Io {
            path: PathBuf::from("/proj/node_modules/pkg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("resolver I/O error"));
        assert!(msg.contains("node_modules/pkg"));
    }

    #[test]
    fn interrupted_display() {
        assert_eq!(
            ResolverError::Interrupted.to_string(),
            "resolution interrupted"
        );
    }
}
