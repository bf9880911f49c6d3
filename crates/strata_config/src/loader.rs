//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file expected at the project root.
///
/// Changes to this file force a wholesale cache invalidation, so the
/// invalidation engine needs to know it by name.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Loads and validates a `strata.toml` configuration from a project
/// directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `strata.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and resolution settings.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.root.is_empty() {
        return Err(ConfigError::MissingField("project.root".to_string()));
    }
    if config.resolution.source_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "resolution.source_extensions must not be empty".to_string(),
        ));
    }
    if config.resolution.declaration_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "resolution.declaration_extensions must not be empty".to_string(),
        ));
    }
    for (alias, candidates) in &config.resolution.paths {
        validate_pattern(alias)?;
        for candidate in candidates {
            validate_pattern(candidate)?;
        }
    }
    Ok(())
}

/// A path-mapping pattern may contain at most one `*`.
fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.matches('*').count() > 1 {
        return Err(ConfigError::Validation(format!(
            "pattern '{pattern}' contains more than one wildcard"
        )));
    }
    Ok(())
}
