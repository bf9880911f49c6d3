//! Shared helpers for locating the project and its source files.

use std::path::{Path, PathBuf};

use strata_config::{ProjectConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Determines the project root directory.
///
/// With `--config <path>`, the project root is the configuration
/// file's directory. Otherwise the current directory and its ancestors
/// are searched for a `strata.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(config) = &global.config {
        let config_path = PathBuf::from(config);
        let dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok(dir);
    }

    let mut dir = std::env::current_dir()?;
    loop {
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(format!("no {CONFIG_FILE_NAME} found in this directory or any parent").into());
        }
    }
}

/// Recursively discovers program source files under `dir`, matching
/// the configured source and declaration extensions. `node_modules`
/// and dot-directories are skipped; results are sorted.
pub fn discover_source_files(dir: &Path, config: &ProjectConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_source_files(dir, config, &mut files);
    files.sort();
    files
}

fn collect_source_files(dir: &Path, config: &ProjectConfig, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if name == "node_modules" || name.starts_with('.') {
                continue;
            }
            collect_source_files(&path, config, out);
        } else if matches_extensions(&name, config) {
            out.push(path);
        }
    }
}

fn matches_extensions(file_name: &str, config: &ProjectConfig) -> bool {
    config
        .resolution
        .source_extensions
        .iter()
        .chain(config.resolution.declaration_extensions.iter())
        .any(|ext| file_name.len() > ext.len() + 1 && file_name.ends_with(&format!(".{ext}")))
}
