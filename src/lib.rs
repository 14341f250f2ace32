//! Batch preparation of game catalog thumbnails.
//!
//! Four stages chained by files: hash the catalog (`hasher`), convert matched
//! images (`images::matched`), convert fallback images (`images::fallback`),
//! and emit the URL UPDATE script (`sql`). `cli` wraps each stage for the
//! `thumbprep` binary.
pub mod cli;
pub mod error;
pub mod hasher;
pub mod images;
pub mod logging;
pub mod normalization;
pub mod sql;
pub mod table;

pub mod util {
    pub mod env;
}

pub use error::{PipelineError, Result};
pub use normalization::GameKey;
