//! Fatal error types for extraction and output.
//!
//! Per-file read problems are not errors; they are collected as
//! [`SkippedFile`](crate::models::SkippedFile) diagnostics instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Input root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Input root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Failed to read input root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid review file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
