//! Configuration types deserialized from `strata.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `strata.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version, source root).
    pub project: ProjectMeta,
    /// Module and type-reference resolution settings.
    #[serde(default)]
    pub resolution: ResolutionConfig,
    /// Build-info persistence settings.
    #[serde(default)]
    pub buildinfo: BuildInfoConfig,
}

/// Core project metadata required in every `strata.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
    /// Directory containing the program's source files, relative to the
    /// project root.
    pub root: String,
}

/// Settings that control how import specifiers and type references are
/// resolved to files.
///
/// Every field here affects resolution outcomes and therefore feeds the
/// configuration fingerprint; changing any of them invalidates the whole
/// persisted cache.
#[derive(Debug, Deserialize)]
pub struct ResolutionConfig {
    /// The resolution strategy for bare specifiers.
    #[serde(default)]
    pub strategy: ResolutionStrategy,
    /// Implementation-file extensions, in preference order (e.g. `ts`
    /// before `tsx`).
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    /// Declaration-file extensions, in preference order.
    #[serde(default = "default_declaration_extensions")]
    pub declaration_extensions: Vec<String>,
    /// Directories searched for global type declarations, in search
    /// order. Accepts a single string or a list.
    #[serde(default = "default_type_roots", deserialize_with = "string_or_vec")]
    pub type_roots: Vec<String>,
    /// Path mappings: alias pattern to candidate patterns. Patterns may
    /// contain at most one `*`.
    #[serde(default)]
    pub paths: BTreeMap<String, Vec<String>>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            strategy: ResolutionStrategy::default(),
            source_extensions: default_source_extensions(),
            declaration_extensions: default_declaration_extensions(),
            type_roots: default_type_roots(),
            paths: BTreeMap::new(),
        }
    }
}

fn default_source_extensions() -> Vec<String> {
    vec!["ts".to_string(), "tsx".to_string()]
}

fn default_declaration_extensions() -> Vec<String> {
    vec!["d.ts".to_string()]
}

fn default_type_roots() -> Vec<String> {
    vec!["node_modules/@types".to_string()]
}

/// Resolution strategy for bare (non-relative) specifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// Walk `node_modules` directories upward from the containing file
    /// (default).
    #[default]
    Node,
    /// Resolve bare specifiers only against the project root.
    Classic,
}

/// Build-info persistence settings.
#[derive(Debug, Deserialize)]
pub struct BuildInfoConfig {
    /// Path of the build-info artifact, relative to the project root.
    #[serde(default = "default_buildinfo_path")]
    pub path: String,
}

impl Default for BuildInfoConfig {
    fn default() -> Self {
        Self {
            path: default_buildinfo_path(),
        }
    }
}

fn default_buildinfo_path() -> String {
    ".strata/buildinfo.stb".to_string()
}

/// Deserializes a field that can be either a single string or a list of
/// strings, so `type_roots = "typings"` and `type_roots = ["typings"]`
/// both parse.
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn resolution_defaults() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.resolution.strategy, ResolutionStrategy::Node);
        assert_eq!(config.resolution.source_extensions, vec!["ts", "tsx"]);
        assert_eq!(config.resolution.declaration_extensions, vec!["d.ts"]);
        assert_eq!(config.resolution.type_roots, vec!["node_modules/@types"]);
        assert!(config.resolution.paths.is_empty());
    }

    #[test]
    fn strategy_classic() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"

[resolution]
strategy = "classic"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.resolution.strategy, ResolutionStrategy::Classic);
    }

    #[test]
    fn type_roots_single_string() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"

[resolution]
type_roots = "typings"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.resolution.type_roots, vec!["typings"]);
    }

    #[test]
    fn type_roots_list() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"

[resolution]
type_roots = ["typings", "node_modules/@types"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.resolution.type_roots,
            vec!["typings", "node_modules/@types"]
        );
    }

    #[test]
    fn path_mappings() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"

[resolution.paths]
"@lib/*" = ["lib/*"]
"@generated" = ["build/generated/index"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.resolution.paths["@lib/*"], vec!["lib/*"]);
        assert_eq!(
            config.resolution.paths["@generated"],
            vec!["build/generated/index"]
        );
    }

    #[test]
    fn buildinfo_default_path() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.buildinfo.path, ".strata/buildinfo.stb");
    }

    #[test]
    fn buildinfo_custom_path() {
        let toml = r#"
[project]
name = "app"
version = "0.1.0"
root = "src"

[buildinfo]
path = "out/cache.stb"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.buildinfo.path, "out/cache.stb");
    }
}
