//! Stage runners behind the `thumbprep` subcommands. Each takes a plain
//! config struct, runs one stage, and prints its summary to stdout.
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

pub mod convert;
pub mod hash;
pub mod update_sql;

/// Summary format on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `key=value` lines.
    #[default]
    Text,
    Json,
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub(crate) fn emit<T: Serialize>(format: OutputFormat, lines: &[String], value: &T) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for line in lines {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_hang_off_base() {
        let base = Path::new("/data/run");
        assert_eq!(
            resolve_against(base, Path::new("generated/s3")),
            PathBuf::from("/data/run/generated/s3")
        );
        assert_eq!(
            resolve_against(base, Path::new("/abs/out")),
            PathBuf::from("/abs/out")
        );
    }
}
