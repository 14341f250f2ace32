use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// How many failures are echoed in a summary.
pub const MAX_FAILURE_SAMPLES: usize = 20;
/// Diagnostic text is cut to this many characters.
pub const MAX_REASON_CHARS: usize = 300;

pub const MISSING_SOURCE: &str = "missing source";

/// Where a failure came from: a CSV line or a file in the fallback directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureSource {
    Row { line: usize, matched_file: String },
    File { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(flatten)]
    pub source: FailureSource,
    pub reason: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            FailureSource::Row { line, matched_file } => write!(
                f,
                "line={line} matched_file={matched_file} reason={}",
                self.reason
            ),
            FailureSource::File { name } => write!(f, "file={name} reason={}", self.reason),
        }
    }
}

/// Counters for the matched-file converter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchedReport {
    pub csv: PathBuf,
    pub out_dir: PathBuf,
    pub total_rows: usize,
    pub rows_with_matched_file: usize,
    pub processed: usize,
    pub converted: usize,
    pub missing_source: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl MatchedReport {
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("csv={}", self.csv.display()),
            format!("out_dir={}", self.out_dir.display()),
            format!("total_rows={}", self.total_rows),
            format!("rows_with_matched_file={}", self.rows_with_matched_file),
            format!("processed={}", self.processed),
            format!("converted={}", self.converted),
            format!("missing_source={}", self.missing_source),
            format!("failed={}", self.failed),
        ];
        push_samples(&mut lines, &self.failures);
        lines
    }
}

/// Counters for the fallback converter. `source_missing` is set when the
/// source directory did not exist and nothing was attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FallbackReport {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub source_missing: bool,
    pub total_images: usize,
    pub processed: usize,
    pub converted: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl FallbackReport {
    pub fn summary_lines(&self) -> Vec<String> {
        if self.source_missing {
            return vec![format!(
                "source directory not found: {}",
                self.src_dir.display()
            )];
        }
        let mut lines = vec![
            format!("src_dir={}", self.src_dir.display()),
            format!("out_dir={}", self.out_dir.display()),
            format!("total_images={}", self.total_images),
            format!("processed={}", self.processed),
            format!("converted={}", self.converted),
            format!("failed={}", self.failed),
        ];
        push_samples(&mut lines, &self.failures);
        lines
    }
}

fn push_samples(lines: &mut Vec<String>, failures: &[Failure]) {
    if failures.is_empty() {
        return;
    }
    lines.push("failure_samples:".to_string());
    lines.extend(
        failures
            .iter()
            .take(MAX_FAILURE_SAMPLES)
            .map(ToString::to_string),
    );
}
