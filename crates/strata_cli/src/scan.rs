//! Line-based extraction of import and reference specifiers.
//!
//! This is a host-side collaborator, not part of the cache core: the
//! cache only needs *keys*, and a real compiler would produce them from
//! its AST. A cheap line scan is enough for the CLI to drive a full
//! resolution pass.

use strata_resolve::{ResolutionKind, ResolutionMode};

/// One specifier found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSpecifier {
    /// The specifier text.
    pub specifier: String,
    /// What kind of reference it is.
    pub kind: ResolutionKind,
    /// Module-system semantics of the referencing syntax.
    pub mode: ResolutionMode,
}

/// Scans source text for import and triple-slash reference specifiers.
pub fn scan_specifiers(source: &str) -> Vec<ScannedSpecifier> {
    let mut out = Vec::new();
    for line in source.lines() {
        let line = line.trim_start();
        if let Some(specifier) = reference_attribute(line, "types") {
            out.push(ScannedSpecifier {
                specifier: specifier.to_string(),
                kind: ResolutionKind::TypeReference,
                mode: ResolutionMode::Require,
            });
        } else if let Some(specifier) = reference_attribute(line, "lib") {
            out.push(ScannedSpecifier {
                specifier: specifier.to_string(),
                kind: ResolutionKind::LibraryReference,
                mode: ResolutionMode::Require,
            });
        } else if let Some(specifier) = reference_attribute(line, "path") {
            out.push(ScannedSpecifier {
                specifier: specifier.to_string(),
                kind: ResolutionKind::Module,
                mode: ResolutionMode::Require,
            });
        } else if (line.starts_with("import") || line.starts_with("export"))
            && line.contains(" from ")
        {
            if let Some(specifier) = quoted_after(line, " from ") {
                out.push(ScannedSpecifier {
                    specifier: specifier.to_string(),
                    kind: ResolutionKind::Module,
                    mode: ResolutionMode::Import,
                });
            }
        } else if line.starts_with("import ") || line.starts_with("import\"") {
            // Bare side-effect import: `import "./polyfill";`
            if let Some(specifier) = quoted_after(line, "import") {
                out.push(ScannedSpecifier {
                    specifier: specifier.to_string(),
                    kind: ResolutionKind::Module,
                    mode: ResolutionMode::Import,
                });
            }
        } else if let Some(specifier) = quoted_after(line, "require(") {
            out.push(ScannedSpecifier {
                specifier: specifier.to_string(),
                kind: ResolutionKind::Module,
                mode: ResolutionMode::Require,
            });
        }
    }
    out
}

/// Extracts the value of `/// <reference {attr}="..."/>`.
fn reference_attribute<'a>(line: &'a str, attr: &str) -> Option<&'a str> {
    if !line.starts_with("///") || !line.contains("<reference") {
        return None;
    }
    let marker = format!("{attr}=");
    let rest = &line[line.find(&marker)? + marker.len()..];
    quoted(rest)
}

/// Extracts the first quoted string after `marker`.
fn quoted_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &line[line.find(marker)? + marker.len()..];
    quoted(rest)
}

/// Extracts the content of the leading quoted string in `text`.
fn quoted(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = &text[1..];
    let end = inner.find(quote)?;
    Some(&inner[..end])
}
