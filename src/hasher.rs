//! Stage 1: append a `hashed` column derived from (provider, game_id).
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::normalization::GameKey;
use crate::table::{field, Table};

pub const HASHED_COLUMN: &str = "hashed";

/// Row-level counts reported after hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HashSummary {
    pub rows: usize,
    pub hashed: usize,
    pub without_image: usize,
}

/// Produce the augmented table. Original cells are passed through untouched;
/// short rows are right-padded to the header width.
pub fn build_hashed_table(input: &Table) -> Result<(Table, HashSummary)> {
    let provider_idx = input.require("provider")?;
    let game_id_idx = input.require("game_id")?;
    let file_idx = input.require("downloaded_file")?;

    let width = input.header.len();
    let mut header = input.header.clone();
    header.push(HASHED_COLUMN.to_string());

    let mut summary = HashSummary::default();
    let mut rows = Vec::with_capacity(input.rows.len());
    for row in &input.rows {
        let mut out = row.clone();
        if out.len() < width {
            out.resize(width, String::new());
        }

        let hashed = if field(&out, file_idx).is_empty() {
            summary.without_image += 1;
            String::new()
        } else {
            summary.hashed += 1;
            GameKey::new(&out[provider_idx], &out[game_id_idx]).digest()
        };
        out.push(hashed);
        rows.push(out);
        summary.rows += 1;
    }

    Ok((Table { header, rows }, summary))
}

/// Read `input`, hash, and overwrite `output`. Schema problems abort before
/// anything is written.
pub fn run(input: &Path, output: &Path) -> Result<HashSummary> {
    let table = Table::read(input)?;
    let (hashed, summary) = build_hashed_table(&table)?;
    hashed.write(output)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = summary.rows,
        hashed = summary.hashed,
        without_image = summary.without_image,
        "hashed table written"
    );
    Ok(summary)
}
