//! `strata clean` — discard persisted build state.

use crate::pipeline::resolve_project_root;
use crate::{CleanArgs, GlobalArgs};

/// Version string stamped into rewritten artifacts.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the `strata clean` command. Returns the process exit code.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = strata_config::load_config(&project_dir)?;
    let buildinfo_path = project_dir.join(&config.buildinfo.path);

    if args.persisted_only {
        // Keep file fingerprints, drop only the resolution section.
        let cleaned = strata_buildinfo::clean_persisted_program(&buildinfo_path, TOOL_VERSION)?;
        if !global.quiet {
            if cleaned {
                eprintln!("   Cleaned persisted resolutions in {}", config.buildinfo.path);
            } else {
                eprintln!("   No usable build-info artifact to clean");
            }
        }
        return Ok(0);
    }

    match std::fs::remove_file(&buildinfo_path) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("   Removed {}", config.buildinfo.path);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if !global.quiet {
                eprintln!("   No build-info artifact to remove");
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(0)
}
