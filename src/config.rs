//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.review-extract.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".review-extract.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Static server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input root and output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per paper.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory that receives papers.json and stats.json.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            output: default_output(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("../data_iclr_all_topics/iclr_compiled_v2")
}

fn default_output() -> PathBuf {
    PathBuf::from("data")
}

/// Paper scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Glob for human review file names.
    #[serde(default = "default_review_pattern")]
    pub review_pattern: String,

    /// Show a progress bar while scanning.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            review_pattern: default_review_pattern(),
            show_progress: true,
        }
    }
}

fn default_review_pattern() -> String {
    "*.txt".to_string()
}

fn default_true() -> bool {
    true
}

/// Static file server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory to serve. Falls back to `paths.output` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Open the served URL in a browser on startup.
    #[serde(default)]
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dir: None,
            open_browser: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        use crate::cli::Command;

        if args.verbose {
            self.general.verbose = true;
        }

        match args.command() {
            Command::Extract(extract) => {
                if let Some(ref root) = extract.root {
                    self.paths.root = root.clone();
                }
                if let Some(ref output) = extract.output {
                    self.paths.output = output.clone();
                }
                if let Some(ref pattern) = extract.pattern {
                    self.scanner.review_pattern = pattern.clone();
                }
                if args.quiet || extract.no_progress {
                    self.scanner.show_progress = false;
                }
            }
            Command::Serve(serve) => {
                if let Some(ref host) = serve.host {
                    self.server.host = host.clone();
                }
                if let Some(port) = serve.port {
                    self.server.port = port;
                }
                if let Some(ref dir) = serve.dir {
                    self.server.dir = Some(dir.clone());
                }
                if serve.open {
                    self.server.open_browser = true;
                }
            }
        }
    }

    /// The directory the static server exposes.
    pub fn serve_dir(&self) -> PathBuf {
        self.server
            .dir
            .clone()
            .unwrap_or_else(|| self.paths.output.clone())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
