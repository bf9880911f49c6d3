//! Strata CLI — the command-line interface for the Strata resolution
//! cache.
//!
//! Provides `strata build` for running one incremental resolution pass
//! over a project (reusing the persisted cache when valid) and
//! `strata clean` for discarding persisted state.

#![warn(missing_docs)]

mod build;
mod clean;
mod pipeline;
mod prober;
mod scan;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Strata — a persisted resolution cache for incremental builds.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Strata incremental resolution cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (per-resolution) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `strata.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one incremental resolution pass over the project.
    Build(BuildArgs),
    /// Discard persisted build state.
    Clean(CleanArgs),
}

/// Arguments for the `strata build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Ignore the persisted cache and resolve everything from scratch.
    #[arg(long)]
    pub fresh: bool,

    /// Output format for the resolution report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Skip writing the build-info artifact at the end of the pass.
    #[arg(long)]
    pub no_persist: bool,
}

/// Arguments for the `strata clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Keep the artifact but discard only its resolution section, so
    /// the next build re-resolves from scratch while other incremental
    /// state survives.
    #[arg(long)]
    pub persisted_only: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Resolution report format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print per-resolution detail.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => terminal_supports_color(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Rough terminal detection — checks the TERM env var.
fn terminal_supports_color() -> bool {
    std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["strata", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(!args.fresh);
                assert_eq!(args.format, ReportFormat::Text);
                assert!(!args.no_persist);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_fresh_json() {
        let cli = Cli::parse_from(["strata", "build", "--fresh", "--format", "json"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.fresh);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_no_persist() {
        let cli = Cli::parse_from(["strata", "build", "--no-persist"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.no_persist),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_clean_default() {
        let cli = Cli::parse_from(["strata", "clean"]);
        match cli.command {
            Command::Clean(ref args) => assert!(!args.persisted_only),
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_clean_persisted_only() {
        let cli = Cli::parse_from(["strata", "clean", "--persisted-only"]);
        match cli.command {
            Command::Clean(ref args) => assert!(args.persisted_only),
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["strata", "--quiet", "--color", "never", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["strata", "--verbose", "build"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["strata", "--config", "/path/to/strata.toml", "build"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/strata.toml"));
    }

    #[test]
    fn parse_color_choices() {
        for (value, expected) in [
            ("auto", ColorChoice::Auto),
            ("always", ColorChoice::Always),
            ("never", ColorChoice::Never),
        ] {
            let cli = Cli::parse_from(["strata", "--color", value, "build"]);
            assert_eq!(cli.color, expected);
        }
    }
}
