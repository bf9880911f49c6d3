//! Project configuration for Strata, loaded from `strata.toml`.
//!
//! Configuration is parsed into strongly-typed structs once and treated
//! as immutable for the lifetime of a build session. The resolution
//! settings carry an explicit fingerprint ([`resolution_fingerprint`])
//! so a persisted cache can detect configuration drift across restarts.

#![warn(missing_docs)]

mod error;
mod fingerprint;
mod loader;
mod types;

pub use error::ConfigError;
pub use fingerprint::resolution_fingerprint;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::{
    BuildInfoConfig, ProjectConfig, ProjectMeta, ResolutionConfig, ResolutionStrategy,
};
