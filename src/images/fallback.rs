//! Stage 3: convert placeholder images, keeping their file stems.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::report::{Failure, FailureSource, FallbackReport, MAX_REASON_CHARS};
use super::resize::{truncate_reason, ResizeParams, Resizer};
use crate::error::{PipelineError, Result};

/// Extensions (lowercase, no dot) picked up from the source directory.
pub const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "avif",
];

#[derive(Debug, Clone)]
pub struct FallbackOptions {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Max images to process; 0 means no cap.
    pub limit: usize,
    pub dry_run: bool,
    pub params: ResizeParams,
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Regular files in `dir` with an allow-listed extension, sorted by name.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if path.is_file() && is_image_file(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Convert every fallback image. A missing source directory is reported in
/// the returned summary rather than as an error.
pub fn convert_fallbacks<R: Resizer + ?Sized>(
    opts: &FallbackOptions,
    resizer: &R,
) -> Result<FallbackReport> {
    let mut report = FallbackReport {
        src_dir: opts.src_dir.clone(),
        out_dir: opts.out_dir.clone(),
        ..Default::default()
    };

    if !opts.src_dir.is_dir() {
        warn!(src_dir = %opts.src_dir.display(), "fallback source directory not found");
        report.source_missing = true;
        return Ok(report);
    }

    fs::create_dir_all(&opts.out_dir).map_err(|e| PipelineError::io(&opts.out_dir, e))?;

    let files = list_image_files(&opts.src_dir)?;
    report.total_images = files.len();
    info!(
        src_dir = %opts.src_dir.display(),
        out_dir = %opts.out_dir.display(),
        total_images = files.len(),
        limit = opts.limit,
        dry_run = opts.dry_run,
        "converting fallback images"
    );

    for src in &files {
        if opts.limit > 0 && report.processed >= opts.limit {
            break;
        }
        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = src
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dst = opts.out_dir.join(format!("{stem}.jpg"));
        report.processed += 1;

        if opts.dry_run {
            debug!(src = %src.display(), dst = %dst.display(), "dry-run: would convert");
            continue;
        }

        match resizer.resize(src, &dst, &opts.params) {
            Ok(()) => report.converted += 1,
            Err(reason) => {
                report.failed += 1;
                let reason = truncate_reason(&reason, MAX_REASON_CHARS);
                warn!(file = %name, %reason, "conversion failed");
                report.failures.push(Failure {
                    source: FailureSource::File { name },
                    reason,
                });
            }
        }
    }

    info!(
        converted = report.converted,
        failed = report.failed,
        "fallback conversion done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::testing::RecordingResizer;
    use tempfile::TempDir;

    fn options(dir: &TempDir, limit: usize) -> FallbackOptions {
        FallbackOptions {
            src_dir: dir.path().join("Fallbacks"),
            out_dir: dir.path().join("s3"),
            limit,
            dry_run: false,
            params: ResizeParams::default(),
        }
    }

    fn seed(dir: &TempDir, names: &[&str]) {
        let src = dir.path().join("Fallbacks");
        fs::create_dir_all(&src).unwrap();
        for n in names {
            fs::write(src.join(n), b"x").unwrap();
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_image_file(Path::new("a/Cover.PNG")));
        assert!(is_image_file(Path::new("b.avif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("README")));
    }

    #[test]
    fn only_images_are_converted_in_name_order() {
        let dir = TempDir::new().unwrap();
        seed(&dir, &["b.png", "notes.txt", "a.JPG", ".DS_Store", "c.webp"]);
        fs::create_dir_all(dir.path().join("Fallbacks/nested.png")).unwrap();
        let resizer = RecordingResizer::default();

        let report = convert_fallbacks(&options(&dir, 0), &resizer).unwrap();
        assert_eq!(report.total_images, 3);
        assert_eq!(report.converted, 3);
        let outs: Vec<PathBuf> = resizer.calls().into_iter().map(|(_, d)| d).collect();
        let s3 = dir.path().join("s3");
        assert_eq!(outs, vec![s3.join("a.jpg"), s3.join("b.jpg"), s3.join("c.jpg")]);
    }

    #[test]
    fn missing_source_dir_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let report = convert_fallbacks(&options(&dir, 0), &RecordingResizer::default()).unwrap();
        assert!(report.source_missing);
        assert_eq!(report.processed, 0);
        assert!(!dir.path().join("s3").exists());
    }

    #[test]
    fn limit_and_failures_by_file_name() {
        let dir = TempDir::new().unwrap();
        seed(&dir, &["a.png", "b.png", "c.png"]);
        let resizer = RecordingResizer::failing_on("a.png", "corrupt image");

        let report = convert_fallbacks(&options(&dir, 2), &resizer).unwrap();
        assert_eq!(report.total_images, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(report.failures[0].to_string(), "file=a.png reason=corrupt image");
    }
}
