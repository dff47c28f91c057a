//! Batch execution over many documents
//!
//! Documents are independent: all mutable state (edit buffer, attribute
//! maps, chain accumulators) is allocated per invocation, so files fan out
//! across threads with no coordination. A failed document never produces
//! output; the other documents proceed.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::edit::PositionMap;
use crate::rewrite::{RewriteOutcome, Rewriter};
use crate::{OrigamiError, Result};

/// Result of transforming one file
#[derive(Debug)]
pub enum FileResult {
    /// No reserved tag present; the input passes through untouched
    Unchanged,
    /// The file was rewritten
    Rewritten { text: String, map: PositionMap },
    /// The transform failed; `source` is kept for diagnostic rendering
    Failed {
        error: OrigamiError,
        source: String,
    },
}

/// Per-file outcome record
#[derive(Debug)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub result: FileResult,
}

/// Aggregate outcome of one run
#[derive(Debug, Default)]
pub struct ExecutionSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl ExecutionSummary {
    pub fn unchanged_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, FileResult::Unchanged))
            .count()
    }

    pub fn rewritten_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, FileResult::Rewritten { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, FileResult::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Runs the rewrite engine over a set of files in parallel
#[derive(Debug)]
pub struct TransformExecutor {
    rewriter: Rewriter,
}

impl TransformExecutor {
    pub fn new(config: &Config) -> Self {
        Self {
            rewriter: Rewriter::from_config(config),
        }
    }

    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    /// Transform every file, in parallel, collecting per-file outcomes in
    /// input order
    pub fn run(&self, files: &[PathBuf]) -> ExecutionSummary {
        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|file| self.process_file(file))
            .collect();

        let summary = ExecutionSummary { outcomes };
        info!(
            total = files.len(),
            rewritten = summary.rewritten_count(),
            unchanged = summary.unchanged_count(),
            failed = summary.failed_count(),
            "transform run finished"
        );
        summary
    }

    fn process_file(&self, file: &Path) -> FileOutcome {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                return FileOutcome {
                    file: file.to_path_buf(),
                    result: FileResult::Failed {
                        error: OrigamiError::io(file, err),
                        source: String::new(),
                    },
                };
            }
        };

        let result = match self.rewriter.rewrite(&source) {
            Ok(RewriteOutcome::Unchanged) => {
                debug!(file = %file.display(), "unchanged");
                FileResult::Unchanged
            }
            Ok(RewriteOutcome::Rewritten(output)) => {
                debug!(file = %file.display(), "rewritten");
                FileResult::Rewritten {
                    text: output.text,
                    map: output.map,
                }
            }
            Err(error) => FileResult::Failed { error, source },
        };

        FileOutcome {
            file: file.to_path_buf(),
            result,
        }
    }

    /// Transform a single in-memory document; used by tests and by
    /// pipeline embeddings that do their own IO
    pub fn transform_source(&self, source: &str) -> Result<RewriteOutcome> {
        self.rewriter.rewrite(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write");
        path
    }

    #[test]
    fn run_classifies_outcomes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plain = write(dir.path(), "plain.mdx", "<p>nothing here</p>");
        let tagged = write(
            dir.path(),
            "tagged.mdx",
            "<p><$if test={x}>y</$if></p>",
        );
        let broken = write(dir.path(), "broken.mdx", "<p><$for of={xs}>y</$for></p>");

        let executor = TransformExecutor::new(&Config::default());
        let summary = executor.run(&[plain, tagged, broken]);

        assert_eq!(summary.unchanged_count(), 1);
        assert_eq!(summary.rewritten_count(), 1);
        assert_eq!(summary.failed_count(), 1);
        assert!(summary.has_failures());

        let failed = summary
            .outcomes
            .iter()
            .find(|o| matches!(o.result, FileResult::Failed { .. }))
            .expect("failed outcome");
        match &failed.result {
            FileResult::Failed { error, source } => {
                assert!(matches!(error, OrigamiError::MissingAttribute { .. }));
                assert!(source.contains("$for"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let executor = TransformExecutor::new(&Config::default());
        let summary = executor.run(&[PathBuf::from("/no/such/file.mdx")]);
        assert_eq!(summary.failed_count(), 1);
    }
}
