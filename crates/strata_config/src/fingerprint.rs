//! Fingerprinting of resolution-affecting configuration.
//!
//! Provenance tracking can tell when the *filesystem* drifted under a
//! cached resolution, but not when the *rules* changed: a different
//! strategy or extension list can flip outcomes without any file event.
//! The session therefore stamps every persisted snapshot with a
//! fingerprint of the settings below and rejects the snapshot wholesale
//! on mismatch.

use serde::Serialize;
use std::collections::BTreeMap;

use strata_common::Fingerprint;

use crate::types::{ProjectConfig, ResolutionStrategy};

/// Canonical view of every setting that can change a resolution outcome.
///
/// Field order is fixed and collections are ordered, so the encoded
/// bytes are stable across loads of semantically identical configs.
/// Cosmetic metadata (`project.name`, `project.version`, TOML
/// formatting) is deliberately excluded.
#[derive(Serialize)]
struct ResolutionView<'a> {
    root: &'a str,
    strategy: ResolutionStrategy,
    source_extensions: &'a [String],
    declaration_extensions: &'a [String],
    type_roots: &'a [String],
    paths: &'a BTreeMap<String, Vec<String>>,
}

/// Computes the fingerprint of a configuration's resolution-affecting
/// settings.
pub fn resolution_fingerprint(config: &ProjectConfig) -> Fingerprint {
    let view = ResolutionView {
        root: &config.project.root,
        strategy: config.resolution.strategy,
        source_extensions: &config.resolution.source_extensions,
        declaration_extensions: &config.resolution.declaration_extensions,
        type_roots: &config.resolution.type_roots,
        paths: &config.resolution.paths,
    };
    let bytes = bincode::serde::encode_to_vec(&view, bincode::config::standard())
        .expect("resolution view serialization cannot fail");
    Fingerprint::of_bytes(&bytes)
}
