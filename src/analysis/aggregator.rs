//! Paper aggregation and statistics.
//!
//! This module runs the scanner over every candidate paper, applies the
//! inclusion filter, and renders summary statistics for the console.

use crate::error::ExtractError;
use crate::models::{DatasetStats, PaperRecord, PaperSet, SkippedFile, SourceKind};
use crate::scanner::{PaperScanner, ScanConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

/// Minimum number of entries across all sources for a paper to be kept:
/// one human reference plus at least two candidates to compare.
pub const MIN_TOTAL_ENTRIES: usize = 3;

/// Result of aggregating an input root.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Papers that passed the inclusion filter.
    pub papers: PaperSet,
    /// Review files that were found but produced no entry.
    pub skipped: Vec<SkippedFile>,
    /// Number of candidate paper directories scanned.
    pub scanned: usize,
    /// Ids of candidates dropped by the inclusion filter.
    pub excluded: Vec<String>,
}

impl Aggregation {
    /// Number of files that failed to read.
    pub fn unreadable_count(&self) -> usize {
        self.skipped.iter().filter(|s| s.is_error()).count()
    }

    /// Number of files skipped for being empty.
    pub fn empty_count(&self) -> usize {
        self.skipped.iter().filter(|s| !s.is_error()).count()
    }
}

/// Returns true if a paper has a human reference and enough entries overall.
pub fn passes_inclusion(record: &PaperRecord) -> bool {
    record.has(SourceKind::Human) && record.total_entries() >= MIN_TOTAL_ENTRIES
}

/// Scan `root` and collect every paper that passes the inclusion filter.
///
/// Fails only if the root itself cannot be listed or the scan config is
/// invalid; unreadable review files end up in [`Aggregation::skipped`].
pub fn aggregate(root: &Path, config: &ScanConfig) -> Result<Aggregation, ExtractError> {
    let scanner = PaperScanner::new(root.to_path_buf(), config)?;
    let dirs = scanner.paper_dirs()?;

    info!(
        "Found {} candidate paper directories in {}",
        dirs.len(),
        scanner.root().display()
    );

    let progress = config.show_progress.then(|| progress_bar(dirs.len() as u64));

    let mut result = Aggregation {
        scanned: dirs.len(),
        ..Aggregation::default()
    };

    for dir in &dirs {
        let load = scanner.load_paper(dir);
        result.skipped.extend(load.skipped);

        if passes_inclusion(&load.record) {
            result.papers.insert(dir.id.clone(), load.record);
        } else if load.record.is_empty() {
            debug!("Excluding {}: no reviews found", dir.id);
            result.excluded.push(dir.id.clone());
        } else {
            debug!(
                "Excluding {}: {} entries, human reviews: {}",
                dir.id,
                load.record.total_entries(),
                load.record.entries(SourceKind::Human).len()
            );
            result.excluded.push(dir.id.clone());
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        "Extracted {} of {} papers ({} files skipped)",
        result.papers.len(),
        result.scanned,
        result.skipped.len()
    );

    Ok(result)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} papers")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Generate a text summary of dataset statistics.
pub fn generate_summary_text(stats: &DatasetStats) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Total Papers: {}", stats.total_papers));
    for kind in SourceKind::ALL {
        lines.push(format!("- {}: {}", source_title(kind), stats.papers_with(kind)));
    }
    lines.push(format!(
        "Created At: {}",
        stats.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    lines.join("\n")
}

fn source_title(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Human => "With human reviews",
        SourceKind::Ours => "With our system",
        SourceKind::OpenReviewer => "With OpenReviewer",
        SourceKind::DeepReviewer => "With DeepReviewer",
    }
}
