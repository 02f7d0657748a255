//! Dataset output generation.
//!
//! This module serializes the aggregated papers and their statistics
//! and writes them as `papers.json` and `stats.json`.

use crate::error::ExtractError;
use crate::models::{DatasetStats, PaperSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the per-paper dataset.
pub const PAPERS_FILE: &str = "papers.json";

/// File name of the statistics record.
pub const STATS_FILE: &str = "stats.json";

/// Paths of the files produced by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub papers: PathBuf,
    pub stats: PathBuf,
}

/// Generate the pretty-printed papers document.
///
/// Non-ASCII text is written as-is, not escaped.
pub fn generate_papers_json(papers: &PaperSet) -> Result<String, ExtractError> {
    serde_json::to_string_pretty(papers).map_err(|source| ExtractError::Serialize {
        what: PAPERS_FILE,
        source,
    })
}

/// Generate the pretty-printed statistics document.
pub fn generate_stats_json(stats: &DatasetStats) -> Result<String, ExtractError> {
    serde_json::to_string_pretty(stats).map_err(|source| ExtractError::Serialize {
        what: STATS_FILE,
        source,
    })
}

/// Write `papers.json` and then `stats.json` into `output_dir`,
/// creating the directory if needed and overwriting existing files.
pub fn write_outputs(
    output_dir: &Path,
    papers: &PaperSet,
    stats: &DatasetStats,
) -> Result<OutputFiles, ExtractError> {
    fs::create_dir_all(output_dir).map_err(|source| ExtractError::CreateOutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let files = OutputFiles {
        papers: output_dir.join(PAPERS_FILE),
        stats: output_dir.join(STATS_FILE),
    };

    write_file(&files.papers, &generate_papers_json(papers)?)?;
    info!("Created {} with {} papers", files.papers.display(), papers.len());

    write_file(&files.stats, &generate_stats_json(stats)?)?;
    info!("Created {}", files.stats.display());

    Ok(files)
}

fn write_file(path: &Path, content: &str) -> Result<(), ExtractError> {
    fs::write(path, content).map_err(|source| ExtractError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperRecord, ReviewEntry, SourceKind};
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(kind: SourceKind, id: &str, content: &str) -> ReviewEntry {
        ReviewEntry {
            id: id.to_string(),
            kind,
            label: id.to_string(),
            content: content.to_string(),
        }
    }

    fn create_test_papers() -> PaperSet {
        let mut record = PaperRecord::new();
        record.insert(
            SourceKind::Human,
            vec![entry(SourceKind::Human, "human_r1", "Très bien — 良い論文")],
        );
        record.insert(
            SourceKind::Ours,
            vec![entry(SourceKind::Ours, "ours_summary", "Our summary")],
        );
        record.insert(
            SourceKind::OpenReviewer,
            vec![entry(SourceKind::OpenReviewer, "openreviewer", "OR review")],
        );

        [("p1".to_string(), record)].into_iter().collect()
    }

    #[test]
    fn test_papers_json_keeps_non_ascii_literal() {
        let json = generate_papers_json(&create_test_papers()).unwrap();

        assert!(json.contains("Très bien — 良い論文"));
        assert!(!json.contains("\\u"));
        assert!(json.contains("\n  \"p1\": {"));
    }

    #[test]
    fn test_papers_json_round_trip() {
        let papers = create_test_papers();
        let json = generate_papers_json(&papers).unwrap();

        let parsed: PaperSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, papers);
    }

    #[test]
    fn test_stats_json_fields() {
        let stats = DatasetStats::from_papers(&create_test_papers(), Utc::now());
        let json = generate_stats_json(&stats).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_papers"], 1);
        assert_eq!(value["papers_with_human_reviews"], 1);
        assert_eq!(value["papers_with_our_system"], 1);
        assert_eq!(value["papers_with_openreviewer"], 1);
        assert_eq!(value["papers_with_deepreviewer"], 0);
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_write_outputs_creates_directory_and_files() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("data");
        let papers = create_test_papers();
        let stats = DatasetStats::from_papers(&papers, Utc::now());

        let files = write_outputs(&out, &papers, &stats).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.papers).unwrap()).unwrap();
        let written_stats: DatasetStats =
            serde_json::from_str(&fs::read_to_string(&files.stats).unwrap()).unwrap();

        let keys = written.as_object().map(|o| o.len()).unwrap_or(0);
        assert_eq!(written_stats.total_papers, keys);
        assert_eq!(written["p1"]["human"][0]["type"], "human");
    }

    #[test]
    fn test_write_outputs_overwrites_previous_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PAPERS_FILE), "stale").unwrap();

        let papers = PaperSet::new();
        let stats = DatasetStats::from_papers(&papers, Utc::now());
        write_outputs(temp.path(), &papers, &stats).unwrap();

        let content = fs::read_to_string(temp.path().join(PAPERS_FILE)).unwrap();
        assert_eq!(content, "{}");
    }

    #[test]
    fn test_write_outputs_fails_when_output_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();

        let papers = PaperSet::new();
        let stats = DatasetStats::from_papers(&papers, Utc::now());
        let err = write_outputs(&blocker, &papers, &stats).unwrap_err();

        assert!(matches!(err, ExtractError::CreateOutputDir { .. }));
    }
}
