//! Paper directory scanner.
//!
//! This module discovers per-paper subdirectories under an input root
//! and loads the review files each source leaves inside them. Every
//! source is described by a [`SourceDescriptor`] and handled the same way.

use crate::error::ExtractError;
use crate::models::{PaperRecord, ReviewEntry, SkipReason, SkippedFile, SourceKind};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// How a source lays out its files inside a paper directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// A directory with one review per matching file.
    Directory,
    /// A single fixed file.
    SingleFile,
}

/// Where a source's reviews live and how their entries are named.
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    /// Source the reviews are attributed to.
    pub kind: SourceKind,
    /// Location relative to the paper directory.
    pub relative_path: &'static str,
    /// Directory of reviews or a single file.
    pub layout: SourceLayout,
    /// Entry id. `{stem}` expands to the file name without extension.
    pub id_template: &'static str,
    /// Entry label. `{stem}` expands to the file name without extension.
    pub label_template: &'static str,
}

impl SourceDescriptor {
    /// Builds the entry id for a file stem.
    pub fn entry_id(&self, stem: &str) -> String {
        self.id_template.replace("{stem}", stem)
    }

    /// Builds the display label for a file stem.
    pub fn entry_label(&self, stem: &str) -> String {
        self.label_template.replace("{stem}", stem)
    }
}

/// The review sources, in output order.
pub const SOURCES: [SourceDescriptor; 4] = [
    SourceDescriptor {
        kind: SourceKind::Human,
        relative_path: "human_reviews/normalized_reviews",
        layout: SourceLayout::Directory,
        id_template: "human_{stem}",
        label_template: "Human Review ({stem})",
    },
    SourceDescriptor {
        kind: SourceKind::Ours,
        relative_path: "ours/summary.txt",
        layout: SourceLayout::SingleFile,
        id_template: "ours_summary",
        label_template: "Our System",
    },
    SourceDescriptor {
        kind: SourceKind::OpenReviewer,
        relative_path: "openreviewer/normalized_review.txt",
        layout: SourceLayout::SingleFile,
        id_template: "openreviewer",
        label_template: "OpenReviewer",
    },
    SourceDescriptor {
        kind: SourceKind::DeepReviewer,
        relative_path: "deepreviewer/normalized_review.txt",
        layout: SourceLayout::SingleFile,
        id_template: "deepreviewer",
        label_template: "DeepReviewer",
    },
];

/// Configuration for paper scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Glob matched against file names in multi-file sources (e.g. "*.txt")
    pub review_pattern: String,
    /// Show a progress bar while scanning
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            review_pattern: "*.txt".to_string(),
            show_progress: false,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            review_pattern: config.review_pattern.clone(),
            show_progress: config.show_progress,
        }
    }
}

/// A candidate paper directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDir {
    /// Paper identifier (the directory name)
    pub id: String,
    /// Full path to the directory
    pub path: PathBuf,
}

/// Everything loaded for a single paper.
#[derive(Debug, Default)]
pub struct PaperLoad {
    /// Entries that survived reading and trimming.
    pub record: PaperRecord,
    /// Files that were found but produced no entry.
    pub skipped: Vec<SkippedFile>,
}

/// Scanner over a root directory of paper subdirectories.
pub struct PaperScanner {
    root: PathBuf,
    matcher: GlobMatcher,
}

impl PaperScanner {
    /// Create a new scanner. Fails if the review pattern is not a valid glob.
    pub fn new(root: PathBuf, config: &ScanConfig) -> Result<Self, ExtractError> {
        let matcher = Glob::new(&config.review_pattern)
            .map_err(|source| ExtractError::InvalidPattern {
                pattern: config.review_pattern.clone(),
                source,
            })?
            .compile_matcher();

        Ok(Self { root, matcher })
    }

    /// The input root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List candidate paper directories, sorted by name.
    ///
    /// Plain files at the top level are skipped.
    pub fn paper_dirs(&self) -> Result<Vec<PaperDir>, ExtractError> {
        let entries = fs::read_dir(&self.root).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ExtractError::RootNotFound(self.root.clone()),
            _ if self.root.exists() && !self.root.is_dir() => {
                ExtractError::RootNotDirectory(self.root.clone())
            }
            _ => ExtractError::RootUnreadable {
                path: self.root.clone(),
                source,
            },
        })?;

        let mut dirs = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Cannot read entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if !path.is_dir() {
                debug!("Skipping non-paper entry: {}", path.display());
                continue;
            }

            dirs.push(PaperDir { id: name, path });
        }

        dirs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(dirs)
    }

    /// Load every source for one paper.
    pub fn load_paper(&self, paper: &PaperDir) -> PaperLoad {
        let mut load = PaperLoad {
            record: PaperRecord::new(),
            skipped: Vec::new(),
        };

        for source in &SOURCES {
            let entries = match source.layout {
                SourceLayout::Directory => self.load_directory(paper, source, &mut load.skipped),
                SourceLayout::SingleFile => self
                    .load_single(paper, source, &mut load.skipped)
                    .into_iter()
                    .collect(),
            };
            load.record.insert(source.kind, entries);
        }

        load
    }

    /// Read every matching file of a multi-file source, sorted by file name.
    fn load_directory(
        &self,
        paper: &PaperDir,
        source: &SourceDescriptor,
        skipped: &mut Vec<SkippedFile>,
    ) -> Vec<ReviewEntry> {
        let dir = paper.path.join(source.relative_path);
        if !dir.is_dir() {
            debug!("{}: no {} directory", paper.id, source.kind);
            return Vec::new();
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name();

        for item in walker {
            let item = match item {
                Ok(i) => i,
                Err(e) => {
                    let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
                    warn!("Error reading {}: {}", path.display(), e);
                    skipped.push(SkippedFile {
                        paper_id: paper.id.clone(),
                        source: source.kind,
                        path,
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                    continue;
                }
            };

            if !self.matcher.is_match(item.file_name()) {
                continue;
            }

            let path = item.path();
            if !path.is_file() {
                continue;
            }

            if let Some(entry) = read_entry(path, paper, source, skipped) {
                entries.push(entry);
            }
        }

        entries
    }

    /// Read the fixed file of a single-file source, if it exists.
    fn load_single(
        &self,
        paper: &PaperDir,
        source: &SourceDescriptor,
        skipped: &mut Vec<SkippedFile>,
    ) -> Option<ReviewEntry> {
        let path = paper.path.join(source.relative_path);
        if !path.exists() {
            debug!("{}: no {} review", paper.id, source.kind);
            return None;
        }

        read_entry(&path, paper, source, skipped)
    }
}

/// Read one review file into an entry. Unreadable and whitespace-only
/// files are recorded in `skipped` and yield `None`.
fn read_entry(
    path: &Path,
    paper: &PaperDir,
    source: &SourceDescriptor,
    skipped: &mut Vec<SkippedFile>,
) -> Option<ReviewEntry> {
    let reason = match fs::read_to_string(path) {
        Ok(content) => {
            let content = content.trim();
            if !content.is_empty() {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();

                return Some(ReviewEntry {
                    id: source.entry_id(&stem),
                    kind: source.kind,
                    label: source.entry_label(&stem),
                    content: content.to_string(),
                });
            }
            debug!("Skipping empty review: {}", path.display());
            SkipReason::Empty
        }
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            SkipReason::Unreadable(e.to_string())
        }
    };

    skipped.push(SkippedFile {
        paper_id: paper.id.clone(),
        source: source.kind,
        path: path.to_path_buf(),
        reason,
    });
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner(root: &Path) -> PaperScanner {
        PaperScanner::new(root.to_path_buf(), &ScanConfig::default()).unwrap()
    }

    fn paper(root: &Path, id: &str) -> PaperDir {
        PaperDir {
            id: id.to_string(),
            path: root.join(id),
        }
    }

    #[test]
    fn test_source_table_order_matches_kinds() {
        let kinds: Vec<_> = SOURCES.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SourceKind::ALL.to_vec());
        assert_eq!(
            SOURCES.iter().filter(|s| s.layout == SourceLayout::Directory).count(),
            1
        );
    }

    #[test]
    fn test_descriptor_templates() {
        let human = &SOURCES[0];
        assert_eq!(human.entry_id("r1"), "human_r1");
        assert_eq!(human.entry_label("r1"), "Human Review (r1)");

        let ours = &SOURCES[1];
        assert_eq!(ours.entry_id("summary"), "ours_summary");
        assert_eq!(ours.entry_label("summary"), "Our System");
    }

    #[test]
    fn test_paper_dirs_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("p2")).unwrap();
        fs::create_dir_all(temp.path().join("p1")).unwrap();
        fs::create_dir_all(temp.path().join(".cache")).unwrap();
        write(temp.path(), "notes.txt", b"not a paper");

        let dirs = scanner(temp.path()).paper_dirs().unwrap();
        let ids: Vec<_> = dirs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec![".cache", "p1", "p2"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = scanner(&missing).paper_dirs().unwrap_err();
        assert!(matches!(err, ExtractError::RootNotFound(_)));
    }

    #[test]
    fn test_root_that_is_a_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "root.txt", b"x");

        let err = scanner(&temp.path().join("root.txt")).paper_dirs().unwrap_err();
        assert!(matches!(err, ExtractError::RootNotDirectory(_)));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = ScanConfig {
            review_pattern: "[".to_string(),
            ..ScanConfig::default()
        };
        let err = PaperScanner::new(PathBuf::from("."), &config).err().unwrap();
        assert!(matches!(err, ExtractError::InvalidPattern { .. }));
    }

    #[test]
    fn test_load_paper_all_sources() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "p1/human_reviews/normalized_reviews/r2.txt", b"Second");
        write(temp.path(), "p1/human_reviews/normalized_reviews/r1.txt", b"  First\n");
        write(temp.path(), "p1/ours/summary.txt", b"Ours");
        write(temp.path(), "p1/openreviewer/normalized_review.txt", b"OR");
        write(temp.path(), "p1/deepreviewer/normalized_review.txt", b"DR");

        let load = scanner(temp.path()).load_paper(&paper(temp.path(), "p1"));
        assert!(load.skipped.is_empty());

        let human = load.record.entries(SourceKind::Human);
        assert_eq!(human.len(), 2);
        assert_eq!(human[0].id, "human_r1");
        assert_eq!(human[0].content, "First");
        assert_eq!(human[1].id, "human_r2");

        assert_eq!(load.record.entries(SourceKind::Ours)[0].label, "Our System");
        assert_eq!(load.record.entries(SourceKind::OpenReviewer)[0].id, "openreviewer");
        assert_eq!(load.record.entries(SourceKind::DeepReviewer)[0].label, "DeepReviewer");
        assert_eq!(load.record.total_entries(), 5);
    }

    #[test]
    fn test_pattern_filters_human_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "p1/human_reviews/normalized_reviews/r1.txt", b"keep");
        write(temp.path(), "p1/human_reviews/normalized_reviews/r2.md", b"ignored");
        write(temp.path(), "p1/human_reviews/normalized_reviews/.r3.txt", b"hidden");

        let load = scanner(temp.path()).load_paper(&paper(temp.path(), "p1"));
        let human = load.record.entries(SourceKind::Human);
        let ids: Vec<_> = human.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["human_.r3", "human_r1"]);
    }

    #[test]
    fn test_whitespace_only_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "p1/ours/summary.txt", b" \n\t \n");

        let load = scanner(temp.path()).load_paper(&paper(temp.path(), "p1"));
        assert!(load.record.is_empty());
        assert_eq!(load.skipped.len(), 1);
        assert_eq!(load.skipped[0].source, SourceKind::Ours);
        assert_eq!(load.skipped[0].reason, SkipReason::Empty);
    }

    #[test]
    fn test_undecodable_file_is_recorded_not_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "p1/human_reviews/normalized_reviews/bad.txt", &[0xff, 0xfe, 0xfd]);
        write(temp.path(), "p1/human_reviews/normalized_reviews/good.txt", b"fine");

        let load = scanner(temp.path()).load_paper(&paper(temp.path(), "p1"));
        assert_eq!(load.record.entries(SourceKind::Human).len(), 1);
        assert_eq!(load.skipped.len(), 1);
        assert!(load.skipped[0].is_error());
        assert!(load.skipped[0].path.ends_with("bad.txt"));
    }

    #[test]
    fn test_missing_sources_produce_no_diagnostics() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("p1")).unwrap();

        let load = scanner(temp.path()).load_paper(&paper(temp.path(), "p1"));
        assert!(load.record.is_empty());
        assert!(load.skipped.is_empty());
    }
}
