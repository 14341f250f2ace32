//! Whole-file CSV reader/writer shared by the stages.
//!
//! Tables are read fully into memory: header first, then every record as a
//! vector of owned strings. A leading UTF-8 BOM is dropped. Records may be
//! ragged; callers use [`field`] to read past the end safely.
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::error::{PipelineError, Result};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a CSV file; a file with no header row is an error.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let text = raw.strip_prefix(BOM).unwrap_or(&raw);
        // The csv reader drops blank lines entirely. They never reach a stage, so
        // hashed output has no padded `,,,` row for them and is not byte-for-byte
        // what a reader yielding empty records would produce.
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for rec in rdr.records() {
            let rec = rec.map_err(|e| PipelineError::csv(path, e))?;
            records.push(rec.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut iter = records.into_iter();
        let header = iter
            .next()
            .ok_or_else(|| PipelineError::EmptyTable(path.to_path_buf()))?;
        Ok(Self {
            header,
            rows: iter.collect(),
        })
    }

    /// Write header and rows, replacing any existing file. Parent directories
    /// are created as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let mut wtr = WriterBuilder::new()
            .flexible(true)
            .terminator(Terminator::CRLF)
            .from_path(path)
            .map_err(|e| PipelineError::csv(path, e))?;
        wtr.write_record(&self.header)
            .map_err(|e| PipelineError::csv(path, e))?;
        for row in &self.rows {
            wtr.write_record(row)
                .map_err(|e| PipelineError::csv(path, e))?;
        }
        wtr.flush().map_err(|e| PipelineError::io(path, e))?;
        Ok(())
    }

    /// Position of a column, matched case-insensitively after trimming.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// Like [`Table::column`] but a missing column is a schema error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| PipelineError::schema(name))
    }
}

/// Trimmed cell value, or `""` when the row is shorter than `idx`.
pub fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// 1-based source line of a data row (the header is line 1).
pub fn line_no(row_index: usize) -> usize {
    row_index + 2
}
