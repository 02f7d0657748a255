//! Data models for the review extractor.
//!
//! This module contains the core data structures used throughout
//! the application for representing review entries, papers, and
//! the summary statistics written next to the dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The system that produced a review.
///
/// Variant order is the order source keys appear in `papers.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Human-written reference reviews
    Human,
    /// Summary produced by our own system
    Ours,
    /// OpenReviewer output
    OpenReviewer,
    /// DeepReviewer output
    DeepReviewer,
}

impl SourceKind {
    /// All sources, in output order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Human,
        SourceKind::Ours,
        SourceKind::OpenReviewer,
        SourceKind::DeepReviewer,
    ];

    /// The key used for this source in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Human => "human",
            SourceKind::Ours => "ours",
            SourceKind::OpenReviewer => "openreviewer",
            SourceKind::DeepReviewer => "deepreviewer",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single review artifact attributed to a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    /// Identifier, unique within its source for a paper.
    pub id: String,
    /// Source that produced the review.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Display label.
    pub label: String,
    /// Trimmed, non-empty review text.
    pub content: String,
}

/// All review entries collected for one paper, keyed by source.
///
/// A source key is only present when it holds at least one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperRecord {
    sources: BTreeMap<SourceKind, Vec<ReviewEntry>>,
}

impl PaperRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the entries for a source. Empty lists are dropped so the
    /// key never appears without entries.
    pub fn insert(&mut self, kind: SourceKind, entries: Vec<ReviewEntry>) {
        if entries.is_empty() {
            self.sources.remove(&kind);
        } else {
            self.sources.insert(kind, entries);
        }
    }

    /// Entries for a source (empty slice if the source is absent).
    pub fn entries(&self, kind: SourceKind) -> &[ReviewEntry] {
        self.sources.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the source has at least one entry.
    pub fn has(&self, kind: SourceKind) -> bool {
        !self.entries(kind).is_empty()
    }

    /// Total number of entries across all sources.
    pub fn total_entries(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }

    /// Returns true if no source produced an entry.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// The full dataset: paper id to its record, ordered by paper id.
pub type PaperSet = BTreeMap<String, PaperRecord>;

/// Why a review file did not produce an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be read or was not valid UTF-8.
    Unreadable(String),
    /// The file held nothing but whitespace.
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(msg) => write!(f, "unreadable: {}", msg),
            SkipReason::Empty => write!(f, "empty after trimming"),
        }
    }
}

/// A review file that was found but skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Paper the file belongs to.
    pub paper_id: String,
    /// Source the file would have contributed to.
    pub source: SourceKind,
    /// Full path of the file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: SkipReason,
}

impl SkippedFile {
    /// Returns true if the file failed to read (as opposed to being empty).
    pub fn is_error(&self) -> bool {
        matches!(self.reason, SkipReason::Unreadable(_))
    }
}

/// Summary statistics written to `stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Number of papers in the dataset.
    pub total_papers: usize,
    /// Papers with at least one human review.
    pub papers_with_human_reviews: usize,
    /// Papers with a summary from our system.
    pub papers_with_our_system: usize,
    /// Papers with an OpenReviewer review.
    pub papers_with_openreviewer: usize,
    /// Papers with a DeepReviewer review.
    pub papers_with_deepreviewer: usize,
    /// When the dataset was generated.
    pub created_at: DateTime<Utc>,
}

impl DatasetStats {
    /// Computes statistics over the included papers.
    pub fn from_papers(papers: &PaperSet, created_at: DateTime<Utc>) -> Self {
        let count = |kind: SourceKind| papers.values().filter(|p| p.has(kind)).count();

        Self {
            total_papers: papers.len(),
            papers_with_human_reviews: count(SourceKind::Human),
            papers_with_our_system: count(SourceKind::Ours),
            papers_with_openreviewer: count(SourceKind::OpenReviewer),
            papers_with_deepreviewer: count(SourceKind::DeepReviewer),
            created_at,
        }
    }

    /// Number of papers carrying the given source.
    pub fn papers_with(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::Human => self.papers_with_human_reviews,
            SourceKind::Ours => self.papers_with_our_system,
            SourceKind::OpenReviewer => self.papers_with_openreviewer,
            SourceKind::DeepReviewer => self.papers_with_deepreviewer,
        }
    }
}
