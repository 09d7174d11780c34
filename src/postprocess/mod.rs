//! Deterministic post-processing of a keyword's downloaded images
//!
//! Applied once per keyword after acquisition completes, regardless of whether
//! the required count was met. Stages run in a fixed order: deduplicate →
//! score → sort → trim → rename/convert. The working set is an in-memory
//! ordered list built from one directory listing; the filesystem is storage
//! only, never re-queried between stages.

mod dedup;
mod rename;
mod score;

pub use rename::RenameOutcome;

use crate::config::{PostProcessConfig, SortDirection, SortKey};
use crate::error::{HarvestError, Result};
use crate::services::{FailureLog, KeywordStage, StatusReporter};
use std::path::{Path, PathBuf};

/// One file in the working set, identified by its listing name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name component, used for rank extraction and ordering
    pub file_name: String,
}

impl CandidateFile {
    fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// Counters describing what post-processing did to a keyword directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessReport {
    /// Files present after acquisition
    pub listed: usize,
    /// Files deleted as content duplicates
    pub duplicates_removed: usize,
    /// Files deleted by trimming
    pub trimmed: usize,
    /// Files moved in place
    pub renamed: usize,
    /// Files re-encoded into the output format
    pub converted: usize,
    /// Conversion failures (source left untouched under its old name)
    pub conversion_failures: usize,
}

/// Applies the post-processing stages to a keyword directory
pub struct PostProcessor<'a> {
    failure_log: &'a FailureLog,
    reporter: &'a dyn StatusReporter,
}

impl<'a> PostProcessor<'a> {
    /// Create a post-processor reporting into the given sinks
    #[must_use]
    pub fn new(failure_log: &'a FailureLog, reporter: &'a dyn StatusReporter) -> Self {
        Self {
            failure_log,
            reporter,
        }
    }

    /// Run all stages over `dest_dir` for `keyword`.
    ///
    /// # Errors
    /// - Filesystem errors listing the directory or moving files
    /// - [`HarvestError::MissingRank`] when rank sorting meets a filename
    ///   without a digit run
    pub fn process(
        &self,
        keyword: &str,
        dest_dir: &Path,
        config: &PostProcessConfig,
    ) -> Result<PostProcessReport> {
        let mut report = PostProcessReport::default();

        let mut files = list_candidates(dest_dir)?;
        report.listed = files.len();

        if config.dedup {
            self.reporter
                .stage(keyword, KeywordStage::Deduplicating, None);
            let kept = dedup::retain_unique(files, self.failure_log);
            report.duplicates_removed = report.listed - kept.len();
            files = kept;
        }

        self.reporter.stage(keyword, KeywordStage::Sorting, None);
        let mut files = self.sorted(files, config)?;

        if config.trim_to_required {
            self.reporter.stage(keyword, KeywordStage::Trimming, None);
            if let Some(required) = config.required_number {
                if files.len() > required {
                    for file in files.drain(required..) {
                        safe_remove(&file.path, self.failure_log);
                        report.trimmed += 1;
                    }
                }
            }
        }

        self.reporter.stage(keyword, KeywordStage::Renaming, None);
        let prefix = config.file_prefix.as_deref().unwrap_or(keyword);
        for outcome in rename::rename_sequence(&files, prefix, config, self.failure_log)? {
            match outcome {
                RenameOutcome::Moved => report.renamed += 1,
                RenameOutcome::Converted => report.converted += 1,
                RenameOutcome::ConversionFailed => report.conversion_failures += 1,
            }
        }

        self.reporter.stage(keyword, KeywordStage::Done, None);
        Ok(report)
    }

    /// Score and order the working set.
    ///
    /// Files are stable-sorted ascending by score, so ties keep their listing
    /// order. A descending direction reverses the fully-sorted sequence as a
    /// whole rather than sorting by a negated key.
    fn sorted(
        &self,
        files: Vec<CandidateFile>,
        config: &PostProcessConfig,
    ) -> Result<Vec<CandidateFile>> {
        let mut scored: Vec<(u64, CandidateFile)> = match config.sort.key {
            SortKey::Rank => files
                .into_iter()
                .map(|file| score::rank_score(&file.file_name).map(|score| (score, file)))
                .collect::<Result<_>>()?,
            SortKey::Resolution => files
                .into_iter()
                .map(|file| {
                    let score = score::resolution_score(&file.path, self.failure_log);
                    (score, file)
                })
                .collect(),
        };

        scored.sort_by_key(|(score, _)| *score);
        if config.sort.direction == SortDirection::Descending {
            scored.reverse();
        }
        Ok(scored.into_iter().map(|(_, file)| file).collect())
    }
}

/// List the files of `dest_dir` in lexicographic name order.
///
/// This single listing defines both dedup's first-wins order and the tie-break
/// order of the sort stage.
fn list_candidates(dest_dir: &Path) -> Result<Vec<CandidateFile>> {
    let entries = std::fs::read_dir(dest_dir)
        .map_err(|e| HarvestError::file_io_error("list directory", dest_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarvestError::file_io_error("list directory", dest_dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(CandidateFile::new(path));
        }
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Delete a file, treating failure as advisory: a quota or lock issue must not
/// abort the keyword.
pub(crate) fn safe_remove(path: &Path, failure_log: &FailureLog) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        let message = format!("Unable to remove {}: {e}", path.display());
        log::warn!("{message}");
        failure_log.record(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortCriterion;
    use crate::services::NoOpStatusReporter;
    use tempfile::TempDir;

    fn write_files(dir: &Path, names_and_bytes: &[(&str, &[u8])]) {
        for (name, bytes) in names_and_bytes {
            std::fs::write(dir.join(name), bytes).unwrap();
        }
    }

    fn remaining_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_listing_is_lexicographic() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("b.jpg", b"b"), ("a.jpg", b"a"), ("c.jpg", b"c")]);
        let files = list_candidates(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_rank_sort_orders_by_digit_run() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[("img3.jpg", b"3"), ("img1.jpg", b"1"), ("img2.jpg", b"2")],
        );
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let config = PostProcessConfig::default();
        let report = processor.process("cat", dir.path(), &config).unwrap();
        assert_eq!(report.listed, 3);
        assert_eq!(report.renamed, 3);

        // rank asc: img1 -> cat1, img2 -> cat2, img3 -> cat3
        assert_eq!(remaining_names(dir.path()), vec!["cat1.jpg", "cat2.jpg", "cat3.jpg"]);
    }

    #[test]
    fn test_missing_rank_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("img1.jpg", b"1"), ("norank.jpg", b"x")]);
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let err = processor
            .process("cat", dir.path(), &PostProcessConfig::default())
            .unwrap_err();
        assert!(matches!(err, HarvestError::MissingRank { .. }));
    }

    #[test]
    fn test_trim_keeps_first_of_sorted_sequence() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("img4.jpg", b"4"),
                ("img2.jpg", b"2"),
                ("img1.jpg", b"1"),
                ("img3.jpg", b"3"),
            ],
        );
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let config = PostProcessConfig {
            required_number: Some(2),
            trim_to_required: true,
            ..PostProcessConfig::default()
        };
        let report = processor.process("cat", dir.path(), &config).unwrap();
        assert_eq!(report.trimmed, 2);
        assert_eq!(remaining_names(dir.path()), vec!["cat1.jpg", "cat2.jpg"]);
    }

    #[test]
    fn test_trim_is_a_noop_below_required_number() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("img1.jpg", b"1"), ("img2.jpg", b"2")]);
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let config = PostProcessConfig {
            required_number: Some(5),
            trim_to_required: true,
            ..PostProcessConfig::default()
        };
        let report = processor.process("cat", dir.path(), &config).unwrap();
        assert_eq!(report.trimmed, 0);
        assert_eq!(remaining_names(dir.path()).len(), 2);
    }

    #[test]
    fn test_descending_reverses_whole_sequence() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[("img3.jpg", b"3"), ("img1.jpg", b"1"), ("img2.jpg", b"2")],
        );
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let config = PostProcessConfig {
            sort: "rank,desc".parse::<SortCriterion>().unwrap(),
            ..PostProcessConfig::default()
        };
        processor.process("cat", dir.path(), &config).unwrap();

        // img3 is now first in the sequence: cat1 came from rank 3
        let cat1 = std::fs::read(dir.path().join("cat1.jpg")).unwrap();
        assert_eq!(cat1, b"3");
        let cat3 = std::fs::read(dir.path().join("cat3.jpg")).unwrap();
        assert_eq!(cat3, b"1");
    }

    #[test]
    fn test_dedup_then_rename_uses_retained_set() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("img1.jpg", b"same"),
                ("img2.jpg", b"same"),
                ("img3.jpg", b"other"),
            ],
        );
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let config = PostProcessConfig {
            dedup: true,
            ..PostProcessConfig::default()
        };
        let report = processor.process("cat", dir.path(), &config).unwrap();
        assert_eq!(report.duplicates_removed, 1);
        // Two survivors, renamed with width 1
        assert_eq!(remaining_names(dir.path()), vec!["cat1.jpg", "cat2.jpg"]);
    }

    #[test]
    fn test_padding_width_follows_final_count() {
        let dir = TempDir::new().unwrap();
        let files: Vec<(String, Vec<u8>)> = (1..=12)
            .map(|i| (format!("img{i:02}.jpg"), format!("{i}").into_bytes()))
            .collect();
        for (name, bytes) in &files {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        processor
            .process("cat", dir.path(), &PostProcessConfig::default())
            .unwrap();

        let names = remaining_names(dir.path());
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"cat01.jpg".to_string()));
        assert!(names.contains(&"cat12.jpg".to_string()));
        assert!(!names.contains(&"cat1.jpg".to_string()));
    }

    #[test]
    fn test_empty_directory_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::disabled();
        let processor = PostProcessor::new(&log, &NoOpStatusReporter);

        let report = processor
            .process("cat", dir.path(), &PostProcessConfig::default())
            .unwrap();
        assert_eq!(report, PostProcessReport::default());
    }
}
