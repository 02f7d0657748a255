//! review-extract - paper review dataset extractor
//!
//! A CLI tool that collects human and machine-generated reviews from a
//! directory of per-paper folders into `papers.json` and `stats.json`,
//! and serves the result over HTTP for a static viewer.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Fatal error (input root missing/unreadable, output not writable,
//!       invalid arguments or config, server bind failure)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;
mod server;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, Command, ExtractArgs};
use config::{Config, CONFIG_FILE};
use models::DatasetStats;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("review-extract v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = match args.command() {
        Command::Extract(extract) => run_extract(&config, &extract),
        Command::Serve(_) => server::run_server(&server::ServeOptions::from(&config)).await,
    };

    if let Err(e) = result {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .review-extract.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize input root, output directory, and server port.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// A non-empty `RUST_LOG` takes precedence over `-v`/`-q` and the config.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, directives.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the log filter from `RUST_LOG`-style directives, falling back to
/// `level` when they are absent, blank, or invalid.
fn log_filter(level: tracing::Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| match EnvFilter::try_new(d) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("⚠️  Ignoring invalid RUST_LOG ({}): {}", d, e);
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::new(level.to_string().to_lowercase()))
}

/// Run the extraction: scan, filter, and write the two output files.
fn run_extract(config: &Config, args: &ExtractArgs) -> Result<()> {
    let start_time = Instant::now();
    let scan_config = scanner::ScanConfig::from(&config.scanner);

    println!("📂 Scanning papers in: {}", config.paths.root.display());

    let result = analysis::aggregate(&config.paths.root, &scan_config)
        .context("Failed to aggregate reviews")?;

    let stats = DatasetStats::from_papers(&result.papers, Utc::now());

    for skipped in &result.skipped {
        debug!(
            "Skipped {} review for {} ({}): {}",
            skipped.source,
            skipped.paper_id,
            skipped.path.display(),
            skipped.reason
        );
    }

    if result.unreadable_count() > 0 {
        warn!(
            "{} review files could not be read and were skipped",
            result.unreadable_count()
        );
    }

    if args.dry_run {
        println!("\n🔍 Dry run: no files written.");
    } else {
        println!("\n📝 Writing dataset to: {}", config.paths.output.display());
        let files = report::write_outputs(&config.paths.output, &result.papers, &stats)
            .context("Failed to write output files")?;
        println!("   Created {}", files.papers.display());
        println!("   Created {}", files.stats.display());
    }

    println!("\n📊 Extraction Summary:");
    println!("   Candidate papers: {}", result.scanned);
    println!("   Excluded (need a human review + 2 others): {}", result.excluded.len());
    println!(
        "   Skipped files: {} unreadable, {} empty",
        result.unreadable_count(),
        result.empty_count()
    );
    for line in analysis::generate_summary_text(&stats).lines() {
        println!("   {}", line);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    println!(
        "\n✅ Extracted {} papers for static evaluation",
        stats.total_papers
    );

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
