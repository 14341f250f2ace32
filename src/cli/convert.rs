use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use super::{emit, resolve_against, OutputFormat};
use crate::images::fallback::{self, FallbackOptions};
use crate::images::matched::{self, MatchedOptions};
use crate::images::{FallbackReport, MagickResizer, MatchedReport, ResizeParams};
use crate::util::env as env_util;

fn default_out_dir() -> PathBuf {
    env_util::env_opt(env_util::OUT_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("generated/s3"))
}

#[derive(Debug, Clone)]
pub struct MatchedConfig {
    pub csv: PathBuf,
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    pub limit: usize,
    pub dry_run: bool,
    pub format: OutputFormat,
}

impl Default for MatchedConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("generated/hashed.csv"),
            base_dir: PathBuf::from("."),
            out_dir: default_out_dir(),
            limit: 0,
            dry_run: false,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub base_dir: PathBuf,
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub limit: usize,
    pub dry_run: bool,
    pub format: OutputFormat,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            src_dir: PathBuf::from("assets/Fallbacks"),
            out_dir: default_out_dir(),
            limit: 0,
            dry_run: false,
            format: OutputFormat::Text,
        }
    }
}

fn resizer_or_warn(dry_run: bool) -> MagickResizer {
    let resizer = MagickResizer::from_env();
    if !dry_run && !resizer.is_available() {
        warn!(
            program = resizer.program(),
            "resize executable not found on PATH; every conversion will fail"
        );
    }
    resizer
}

pub fn run_matched(cfg: MatchedConfig) -> Result<MatchedReport> {
    let opts = MatchedOptions {
        out_dir: resolve_against(&cfg.base_dir, &cfg.out_dir),
        base_dir: cfg.base_dir.clone(),
        limit: cfg.limit,
        dry_run: cfg.dry_run,
        params: ResizeParams::default(),
    };
    let csv = resolve_against(&cfg.base_dir, &cfg.csv);
    let resizer = resizer_or_warn(cfg.dry_run);

    let report = matched::run(&csv, &opts, &resizer)
        .with_context(|| format!("converting images listed in {}", csv.display()))?;
    emit(cfg.format, &report.summary_lines(), &report)?;
    Ok(report)
}

pub fn run_fallbacks(cfg: FallbackConfig) -> Result<FallbackReport> {
    let opts = FallbackOptions {
        src_dir: resolve_against(&cfg.base_dir, &cfg.src_dir),
        out_dir: resolve_against(&cfg.base_dir, &cfg.out_dir),
        limit: cfg.limit,
        dry_run: cfg.dry_run,
        params: ResizeParams::default(),
    };
    let resizer = resizer_or_warn(cfg.dry_run);

    let report = fallback::convert_fallbacks(&opts, &resizer)
        .with_context(|| format!("converting fallbacks in {}", opts.src_dir.display()))?;
    emit(cfg.format, &report.summary_lines(), &report)?;
    Ok(report)
}
