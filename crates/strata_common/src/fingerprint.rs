//! Content fingerprinting for cache validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content fingerprint computed with XXH3.
///
/// Two inputs with the same `Fingerprint` are assumed identical. Strata
/// uses fingerprints to decide whether a persisted snapshot still matches
/// the source files and configuration it was produced from; it never
/// compares file contents directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Fingerprints a byte slice using XXH3-128.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Fingerprints a UTF-8 string (convenience for config and tests).
    pub fn of_str(data: &str) -> Self {
        Self::of_bytes(data.as_bytes())
    }

    /// Returns the raw 128-bit value.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:08x}..)", (self.0 >> 96) as u32)
    }
}
