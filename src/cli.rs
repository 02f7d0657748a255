//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// review-extract - collect paper reviews into JSON and serve them locally
///
/// Scans a directory of per-paper review artifacts, keeps papers with a
/// human reference review and at least two other reviews, and writes
/// papers.json and stats.json for the static viewer.
///
/// Examples:
///   review-extract
///   review-extract extract --root ./iclr_compiled_v2 --output ./data
///   review-extract extract --dry-run
///   review-extract serve --port 8000 --open
///   review-extract --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .review-extract.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .review-extract.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Available subcommands. Extraction runs when none is given.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract reviews into papers.json and stats.json (default)
    Extract(ExtractArgs),
    /// Serve a directory over HTTP with permissive CORS headers
    Serve(ServeArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Extract(ExtractArgs::default())
    }
}

/// Arguments for `extract`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Directory containing one subdirectory per paper
    #[arg(long, value_name = "DIR", env = "REVIEW_EXTRACT_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory to write papers.json and stats.json into
    #[arg(short, long, value_name = "DIR", env = "REVIEW_EXTRACT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Glob for human review file names
    ///
    /// Example: --pattern "*.txt"
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Dry run: scan and report counts without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for `serve`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, value_name = "ADDR")]
    pub host: Option<String>,

    /// Directory to serve (defaults to the output directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Open the server URL in the default browser
    #[arg(long)]
    pub open: bool,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Usage errors exit with code 1; `--help` and `--version` exit with 0.
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|e| {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        })
    }

    /// The subcommand to run, defaulting to extraction.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match self.command() {
            Command::Extract(extract) => {
                if let Some(ref pattern) = extract.pattern {
                    if pattern.trim().is_empty() {
                        return Err("Review pattern must not be empty".to_string());
                    }
                }
            }
            Command::Serve(serve) => {
                if serve.port == Some(0) {
                    return Err("Port must be between 1 and 65535".to_string());
                }

                if let Some(ref dir) = serve.dir {
                    if !dir.is_dir() {
                        return Err(format!("Serve directory does not exist: {}", dir.display()));
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Exit code for a failed parse.
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}
