use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use super::{emit, OutputFormat};
use crate::sql::{self, JoinMode, SqlTarget, DEFAULT_COLUMN, DEFAULT_TABLE};
use crate::util::env as env_util;

/// Export file of the batch run these defaults were set up for.
pub const DEFAULT_PLATFORM_CSV: &str = "platform_games_export_2026-02-27_162847.csv";
pub const DEFAULT_CDN_BASE: &str = "https://d13ko3zh1icget.cloudfront.net/game_thumbnail_images";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlMode {
    /// Join platform export and hashed CSV, gated on converted images.
    #[default]
    ThreeWay,
    /// Hashed CSV already has `id`.
    Direct,
}

#[derive(Debug, Clone)]
pub struct SqlConfig {
    pub mode: SqlMode,
    pub platform_csv: PathBuf,
    pub hashed_csv: PathBuf,
    pub s3_dir: PathBuf,
    pub output: PathBuf,
    pub cdn_base: String,
    pub table: String,
    pub column: String,
    pub format: OutputFormat,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            mode: SqlMode::ThreeWay,
            platform_csv: PathBuf::from(DEFAULT_PLATFORM_CSV),
            hashed_csv: PathBuf::from("generated/hashed.csv"),
            s3_dir: env_util::env_opt(env_util::OUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("generated/s3")),
            output: PathBuf::from("generated/update_games_thumbnail_url.sql"),
            cdn_base: env_util::env_opt(env_util::CDN_BASE_VAR)
                .unwrap_or_else(|| DEFAULT_CDN_BASE.to_string()),
            table: DEFAULT_TABLE.to_string(),
            column: DEFAULT_COLUMN.to_string(),
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Serialize)]
struct SqlOutput<'a> {
    output: &'a PathBuf,
    rows_included: usize,
}

pub fn run(cfg: SqlConfig) -> Result<usize> {
    let mode = match cfg.mode {
        SqlMode::ThreeWay => JoinMode::ThreeWay {
            platform_csv: cfg.platform_csv.clone(),
            image_dir: cfg.s3_dir.clone(),
        },
        SqlMode::Direct => JoinMode::Direct,
    };
    let target = SqlTarget::new(&cfg.table, &cfg.column, &cfg.cdn_base);

    let rows = sql::run(&mode, &cfg.hashed_csv, &target, &cfg.output)
        .with_context(|| format!("generating {}", cfg.output.display()))?;
    let lines = [
        format!("Wrote SQL: {}", cfg.output.display()),
        format!("Rows included: {rows}"),
    ];
    emit(
        cfg.format,
        &lines,
        &SqlOutput {
            output: &cfg.output,
            rows_included: rows,
        },
    )?;
    Ok(rows)
}
