//! Identity of a cached resolution request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use strata_common::path::normalize;

/// What kind of name is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionKind {
    /// An import specifier (`import ... from "x"`, `require("x")`).
    Module,
    /// A global type reference (`/// <reference types="x"/>`).
    TypeReference,
    /// A library reference (`/// <reference lib="x"/>`).
    LibraryReference,
}

/// Module-system semantics the surrounding compiler resolved under.
///
/// The same specifier from the same file can legally resolve to
/// different targets under CommonJS and ES-module rules, so the mode is
/// part of the cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionMode {
    /// CommonJS `require` semantics.
    Require,
    /// ES-module `import` semantics.
    Import,
}

/// Uniquely identifies one resolution request.
///
/// Equality is exact on all four fields. Keys are immutable; the
/// containing file path is normalized on construction so lookups agree
/// regardless of how callers spelled the path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolutionKey {
    /// The string the import or reference names.
    pub specifier: String,
    /// Normalized path of the file containing the specifier.
    pub containing_file: PathBuf,
    /// Module-system semantics in effect.
    pub mode: ResolutionMode,
    /// What kind of name this is.
    pub kind: ResolutionKind,
}

impl ResolutionKey {
    /// Creates a key with an explicit kind and mode.
    pub fn new(
        specifier: impl Into<String>,
        containing_file: &Path,
        mode: ResolutionMode,
        kind: ResolutionKind,
    ) -> Self {
        Self {
            specifier: specifier.into(),
            containing_file: normalize(containing_file),
            mode,
            kind,
        }
    }

    /// Creates a module-import key.
    pub fn module(specifier: impl Into<String>, containing_file: &Path, mode: ResolutionMode) -> Self {
        Self::new(specifier, containing_file, mode, ResolutionKind::Module)
    }

    /// Creates a type-reference key. Type references always use
    /// `Require` semantics.
    pub fn type_reference(specifier: impl Into<String>, containing_file: &Path) -> Self {
        Self::new(
            specifier,
            containing_file,
            ResolutionMode::Require,
            ResolutionKind::TypeReference,
        )
    }

    /// Creates a library-reference key.
    pub fn library_reference(specifier: impl Into<String>, containing_file: &Path) -> Self {
        Self::new(
            specifier,
            containing_file,
            ResolutionMode::Require,
            ResolutionKind::LibraryReference,
        )
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ResolutionKind::Module => "module",
            ResolutionKind::TypeReference => "types",
            ResolutionKind::LibraryReference => "lib",
        };
        write!(
            f,
            "{kind} '{}' from {}",
            self.specifier,
            self.containing_file.display()
        )
    }
}
