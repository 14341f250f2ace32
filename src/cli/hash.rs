use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use super::{emit, OutputFormat};
use crate::hasher::{self, HashSummary};

#[derive(Debug, Clone)]
pub struct HashConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("games.csv"),
            output: PathBuf::from("generated/hashed.csv"),
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Serialize)]
struct HashOutput<'a> {
    output: &'a PathBuf,
    #[serde(flatten)]
    summary: HashSummary,
}

pub fn run(cfg: HashConfig) -> Result<HashSummary> {
    let summary = hasher::run(&cfg.input, &cfg.output)
        .with_context(|| format!("hashing {}", cfg.input.display()))?;
    let lines = [format!("Wrote hashed CSV: {}", cfg.output.display())];
    emit(
        cfg.format,
        &lines,
        &HashOutput {
            output: &cfg.output,
            summary,
        },
    )?;
    Ok(summary)
}
