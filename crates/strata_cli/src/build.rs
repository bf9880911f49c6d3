//! `strata build` — one incremental resolution pass over the project.
//!
//! Orchestrates the full cycle:
//! 1. Locate the project and load `strata.toml`
//! 2. Discover and fingerprint program source files
//! 3. Open the build session (reusing the persisted cache when valid)
//! 4. Scan sources for specifiers and resolve each one
//! 5. Persist the updated cache

use strata_resolve::ResolutionKey;
use strata_session::{BuildSession, ProgramFiles, SessionState};

use crate::pipeline::{discover_source_files, resolve_project_root};
use crate::prober::DiskProber;
use crate::scan::scan_specifiers;
use crate::{BuildArgs, GlobalArgs, ReportFormat};

/// Runs the `strata build` command. Returns the process exit code.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = strata_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!(
            "  Building {} v{}",
            config.project.name, config.project.version
        );
    }

    let src_dir = project_dir.join(&config.project.root);
    let source_files = discover_source_files(&src_dir, &config);
    if source_files.is_empty() {
        eprintln!("error: no source files found in {}", src_dir.display());
        return Ok(1);
    }

    let program = ProgramFiles::from_disk(&source_files);
    let prober = DiskProber::from_config(&project_dir, &config);
    let mut session = BuildSession::open(&project_dir, &config, program, prober);

    if !global.quiet {
        match session.state() {
            SessionState::Reusing => eprintln!("     Cache reusing persisted resolutions"),
            SessionState::Rebuilding => match session.last_rejection() {
                Some(rejection) => eprintln!("     Cache rebuilding ({rejection})"),
                None => eprintln!("     Cache rebuilding"),
            },
            SessionState::SteadyState => {}
        }
    }

    if args.fresh {
        session.force_invalidate_all();
        if !global.quiet {
            eprintln!("     Cache discarded (--fresh)");
        }
    }

    let mut found = 0usize;
    let mut not_found = 0usize;
    for file in &source_files {
        let content = std::fs::read_to_string(file)?;
        for scanned in scan_specifiers(&content) {
            let key = ResolutionKey::new(scanned.specifier, file, scanned.mode, scanned.kind);
            let entry = session.resolve(key.clone())?;
            match entry.outcome.resolved_path() {
                Some(path) => {
                    found += 1;
                    if global.verbose {
                        eprintln!("     {key} -> {}", path.display());
                    }
                }
                None => {
                    not_found += 1;
                    if global.verbose {
                        eprintln!("     {key} -> not found");
                    }
                }
            }
        }
    }

    let stats = session.cache().stats();

    if !args.no_persist {
        session.persist_now()?;
        if !global.quiet {
            eprintln!(" Persisted {}", config.buildinfo.path);
        }
    }

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                eprintln!(
                    "  Resolved {} lookups ({found} found, {not_found} not found; {} reused, {} fresh)",
                    stats.hits + stats.misses,
                    stats.hits,
                    stats.misses
                );
            }
        }
        ReportFormat::Json => {
            let report = serde_json::json!({
                "project": config.project.name,
                "files": source_files.len(),
                "found": found,
                "notFound": not_found,
                "reused": stats.hits,
                "fresh": stats.misses,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(0)
}
