//! Stage 4: batched `CASE "id"` UPDATE for the thumbnail URL column.
//!
//! Ids and digests are interpolated as-is. They come from the platform export
//! and from our own hex digests, so no quoting beyond the surrounding `'` is done.
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::hasher::HASHED_COLUMN;
use crate::normalization::GameKey;
use crate::table::{field, Table};

pub const DEFAULT_TABLE: &str = "platform.games";
pub const DEFAULT_COLUMN: &str = "thumbnail_url_hyper";
pub const NO_ROWS_COMMENT: &str = "-- No valid rows found in input CSV.";

/// One `WHEN` branch: database id and image digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRow {
    pub id: String,
    pub hashed: String,
}

/// Which inputs the generator joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMode {
    /// Platform export + hashed table, gated on `{hashed}.jpg` existing in `image_dir`.
    ThreeWay {
        platform_csv: PathBuf,
        image_dir: PathBuf,
    },
    /// Hashed table already carries `id`; no join and no image check.
    Direct,
}

/// Target of the generated statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTarget {
    pub table: String,
    pub column: String,
    /// Trailing `/` is ignored.
    pub cdn_base: String,
}

impl SqlTarget {
    pub fn new(table: &str, column: &str, cdn_base: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            cdn_base: cdn_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, hashed: &str) -> String {
        format!("{}/{}.jpg", self.cdn_base, hashed)
    }
}

/// Map each platform (provider, game_id) to its database id. Incomplete
/// rows are skipped; the first id seen for a key wins.
pub fn build_id_lookup(platform: &Table) -> Result<HashMap<GameKey, String>> {
    let id_idx = platform.require("id")?;
    let provider_idx = platform.require("provider")?;
    let game_id_idx = platform.require("game_id")?;

    let mut lookup = HashMap::new();
    for row in &platform.rows {
        let id = field(row, id_idx);
        if id.is_empty() {
            continue;
        }
        let Some(key) = GameKey::non_blank(field(row, provider_idx), field(row, game_id_idx))
        else {
            continue;
        };
        lookup.entry(key).or_insert_with(|| id.to_string());
    }
    Ok(lookup)
}

/// Join hashed rows to database ids, keeping only rows whose converted image
/// is present in `image_dir`. Output follows hashed-table order.
pub fn build_three_way_rows(
    lookup: &HashMap<GameKey, String>,
    hashed: &Table,
    image_dir: &Path,
) -> Result<Vec<UpdateRow>> {
    let provider_idx = hashed.require("provider")?;
    let game_id_idx = hashed.require("game_id")?;
    let hashed_idx = hashed.require(HASHED_COLUMN)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    for row in &hashed.rows {
        let digest = field(row, hashed_idx);
        if digest.is_empty() {
            continue;
        }
        let Some(key) = GameKey::non_blank(field(row, provider_idx), field(row, game_id_idx))
        else {
            continue;
        };
        let Some(id) = lookup.get(&key) else {
            debug!(%key, "no platform id");
            continue;
        };
        if seen.contains(id.as_str()) {
            continue;
        }
        if !image_dir.join(format!("{digest}.jpg")).is_file() {
            debug!(%key, digest, "converted image missing");
            continue;
        }
        seen.insert(id.clone());
        rows.push(UpdateRow {
            id: id.clone(),
            hashed: digest.to_string(),
        });
    }
    Ok(rows)
}

/// Rows straight from an `id` + `hashed` table, first id wins.
pub fn build_direct_rows(table: &Table) -> Result<Vec<UpdateRow>> {
    let id_idx = table.require("id")?;
    let hashed_idx = table.require(HASHED_COLUMN)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    for row in &table.rows {
        let id = field(row, id_idx);
        let digest = field(row, hashed_idx);
        if id.is_empty() || digest.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }
        rows.push(UpdateRow {
            id: id.to_string(),
            hashed: digest.to_string(),
        });
    }
    Ok(rows)
}

/// Render the script: an unconditional NULL reset, then one CASE update
/// covering `rows` (or a comment when there are none).
pub fn build_sql(rows: &[UpdateRow], target: &SqlTarget) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "UPDATE {}", target.table);
    let _ = writeln!(out, "SET \"{}\" = NULL;", target.column);
    out.push('\n');

    if rows.is_empty() {
        out.push_str(NO_ROWS_COMMENT);
        out.push('\n');
        return out;
    }

    let _ = writeln!(out, "UPDATE {}", target.table);
    let _ = writeln!(out, "SET \"{}\" = CASE \"id\"", target.column);
    for row in rows {
        let _ = writeln!(
            out,
            "    WHEN '{}' THEN '{}'",
            row.id,
            target.url_for(&row.hashed)
        );
    }
    out.push_str("END\n");
    out.push_str("WHERE \"id\" IN (\n");
    for (i, row) in rows.iter().enumerate() {
        let suffix = if i + 1 < rows.len() { "," } else { "" };
        let _ = writeln!(out, "    '{}'{}", row.id, suffix);
    }
    out.push_str(");\n");
    out
}

/// Build rows for `mode`, render, and write `output`. Returns the row count.
pub fn run(
    mode: &JoinMode,
    hashed_csv: &Path,
    target: &SqlTarget,
    output: &Path,
) -> Result<usize> {
    let hashed = Table::read(hashed_csv)?;
    let rows = match mode {
        JoinMode::ThreeWay {
            platform_csv,
            image_dir,
        } => {
            let platform = Table::read(platform_csv)?;
            let lookup = build_id_lookup(&platform)?;
            info!(platform_keys = lookup.len(), "platform lookup built");
            build_three_way_rows(&lookup, &hashed, image_dir)?
        }
        JoinMode::Direct => build_direct_rows(&hashed)?,
    };

    let sql = build_sql(&rows, target);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    fs::write(output, sql).map_err(|e| PipelineError::io(output, e))?;
    info!(
        output = %output.display(),
        rows = rows.len(),
        table = %target.table,
        column = %target.column,
        "update sql written"
    );
    Ok(rows.len())
}
