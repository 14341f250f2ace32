//! Stage 2: convert each catalog row's source image to `{hashed}.jpg`.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::report::{Failure, FailureSource, MatchedReport, MAX_REASON_CHARS, MISSING_SOURCE};
use super::resize::{truncate_reason, ResizeParams, Resizer};
use crate::error::{PipelineError, Result};
use crate::hasher::HASHED_COLUMN;
use crate::normalization::GameKey;
use crate::table::{field, line_no, Table};

#[derive(Debug, Clone)]
pub struct MatchedOptions {
    /// Relative `downloaded_file` values are resolved against this.
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Max matched rows to process; 0 means no cap.
    pub limit: usize,
    pub dry_run: bool,
    pub params: ResizeParams,
}

/// Walk the hashed table and convert every row that references an image.
///
/// Per-row problems are recorded in the report; only a table without a
/// `downloaded_file` column is an error.
pub fn convert_matched<R: Resizer + ?Sized>(
    table: &Table,
    opts: &MatchedOptions,
    resizer: &R,
) -> Result<MatchedReport> {
    let file_idx = table.require("downloaded_file")?;
    let provider_idx = table.column("provider");
    let game_id_idx = table.column("game_id");
    let hashed_idx = table.column(HASHED_COLUMN);

    let mut report = MatchedReport {
        out_dir: opts.out_dir.clone(),
        ..Default::default()
    };

    for (i, row) in table.rows.iter().enumerate() {
        report.total_rows += 1;

        let matched_file = field(row, file_idx);
        if matched_file.is_empty() {
            continue;
        }
        report.rows_with_matched_file += 1;
        if opts.limit > 0 && report.processed >= opts.limit {
            continue;
        }

        let name = output_stem(row, hashed_idx, provider_idx, game_id_idx);
        let src = opts.base_dir.join(matched_file);
        let dst = opts.out_dir.join(format!("{name}.jpg"));
        let line = line_no(i);

        report.processed += 1;
        if !src.exists() {
            report.missing_source += 1;
            warn!(line, src = %src.display(), "source image missing");
            report.failures.push(row_failure(line, matched_file, MISSING_SOURCE));
            continue;
        }

        if opts.dry_run {
            debug!(line, src = %src.display(), dst = %dst.display(), "dry-run: would convert");
            continue;
        }

        match resizer.resize(&src, &dst, &opts.params) {
            Ok(()) => report.converted += 1,
            Err(reason) => {
                report.failed += 1;
                let reason = truncate_reason(&reason, MAX_REASON_CHARS);
                warn!(line, src = %src.display(), %reason, "conversion failed");
                report.failures.push(row_failure(line, matched_file, &reason));
            }
        }
    }

    Ok(report)
}

/// Read the hashed CSV, make sure the output directory exists, convert.
pub fn run<R: Resizer + ?Sized>(
    csv_path: &Path,
    opts: &MatchedOptions,
    resizer: &R,
) -> Result<MatchedReport> {
    fs::create_dir_all(&opts.out_dir).map_err(|e| PipelineError::io(&opts.out_dir, e))?;
    let table = Table::read(csv_path)?;
    info!(
        csv = %csv_path.display(),
        out_dir = %opts.out_dir.display(),
        rows = table.rows.len(),
        limit = opts.limit,
        dry_run = opts.dry_run,
        "converting matched images"
    );
    let mut report = convert_matched(&table, opts, resizer)?;
    report.csv = csv_path.to_path_buf();
    info!(
        converted = report.converted,
        missing_source = report.missing_source,
        failed = report.failed,
        "matched conversion done"
    );
    Ok(report)
}

/// The row's `hashed` value, or the digest of its key when that is blank.
fn output_stem(
    row: &[String],
    hashed_idx: Option<usize>,
    provider_idx: Option<usize>,
    game_id_idx: Option<usize>,
) -> String {
    let hashed = hashed_idx.map(|i| field(row, i)).unwrap_or("");
    if !hashed.is_empty() {
        return hashed.to_string();
    }
    let provider = provider_idx.map(|i| field(row, i)).unwrap_or("");
    let game_id = game_id_idx.map(|i| field(row, i)).unwrap_or("");
    GameKey::new(provider, game_id).digest()
}

fn row_failure(line: usize, matched_file: &str, reason: &str) -> Failure {
    Failure {
        source: FailureSource::Row {
            line,
            matched_file: matched_file.to_string(),
        },
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::testing::RecordingResizer;
    use tempfile::TempDir;

    fn hashed_table(rows: &[[&str; 4]]) -> Table {
        Table {
            header: ["provider", "game_id", "downloaded_file", "hashed"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn options(dir: &TempDir, limit: usize) -> MatchedOptions {
        MatchedOptions {
            base_dir: dir.path().to_path_buf(),
            out_dir: dir.path().join("out"),
            limit,
            dry_run: false,
            params: ResizeParams::default(),
        }
    }

    fn touch(dir: &TempDir, rel: &str) {
        let p = dir.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"img").unwrap();
    }

    #[test]
    fn converts_and_names_by_hash() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "img/a.png");
        let table = hashed_table(&[
            ["steam", "123", "img/a.png", "8347e405fa53b68d1a714391b08fa747"],
            ["steam", "124", "", ""],
        ]);
        let resizer = RecordingResizer::default();

        let report = convert_matched(&table, &options(&dir, 0), &resizer).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.rows_with_matched_file, 1);
        assert_eq!(report.converted, 1);
        let calls = resizer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, dir.path().join("img/a.png"));
        assert_eq!(
            calls[0].1,
            dir.path()
                .join("out")
                .join("8347e405fa53b68d1a714391b08fa747.jpg")
        );
    }

    #[test]
    fn blank_hash_falls_back_to_key_digest() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.png");
        let table = hashed_table(&[[" STEAM ", "123", "a.png", ""]]);
        let resizer = RecordingResizer::default();
        convert_matched(&table, &options(&dir, 0), &resizer).unwrap();
        assert!(resizer.calls()[0]
            .1
            .ends_with("8347e405fa53b68d1a714391b08fa747.jpg"));
    }

    #[test]
    fn missing_source_and_failures_do_not_abort() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "bad.png");
        touch(&dir, "good.png");
        let table = hashed_table(&[
            ["p", "1", "gone.png", "h1"],
            ["p", "2", "bad.png", "h2"],
            ["p", "3", "good.png", "h3"],
        ]);
        let long = "x".repeat(500);
        let resizer = RecordingResizer::failing_on("bad.png", &long);

        let report = convert_matched(&table, &options(&dir, 0), &resizer).unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(report.missing_source, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(
            report.failures[0],
            row_failure(2, "gone.png", MISSING_SOURCE)
        );
        assert_eq!(report.failures[1].reason.len(), MAX_REASON_CHARS);
        assert!(matches!(
            report.failures[1].source,
            FailureSource::Row { line: 3, .. }
        ));
    }

    #[test]
    fn limit_caps_processed_rows() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.png");
        let table = hashed_table(&[
            ["p", "1", "", ""],
            ["p", "2", "a.png", "h2"],
            ["p", "3", "a.png", "h3"],
            ["p", "4", "a.png", "h4"],
        ]);
        let resizer = RecordingResizer::default();
        let report = convert_matched(&table, &options(&dir, 2), &resizer).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.rows_with_matched_file, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(resizer.calls().len(), 2);
    }

    #[test]
    fn dry_run_never_invokes_resizer() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.png");
        let table = hashed_table(&[["p", "1", "a.png", "h1"]]);
        let resizer = RecordingResizer::default();
        let mut opts = options(&dir, 0);
        opts.dry_run = true;
        let report = convert_matched(&table, &opts, &resizer).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.converted, 0);
        assert!(resizer.calls().is_empty());
    }

    #[test]
    fn run_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("hashed.csv");
        fs::write(&csv, "provider,game_id,downloaded_file,hashed\n").unwrap();
        let report = run(&csv, &options(&dir, 0), &RecordingResizer::default()).unwrap();
        assert!(dir.path().join("out").is_dir());
        assert_eq!(report.csv, csv);
        assert_eq!(report.total_rows, 0);
    }
}
