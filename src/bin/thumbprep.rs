use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use thumbprep::cli::convert::{run_fallbacks, run_matched, FallbackConfig, MatchedConfig};
use thumbprep::cli::hash::HashConfig;
use thumbprep::cli::update_sql::{SqlConfig, SqlMode};
use thumbprep::cli::OutputFormat;
use thumbprep::util::env;

#[derive(Parser, Debug)]
#[command(name = "thumbprep", version, about = "Game thumbnail preparation pipeline")]
struct Cli {
    /// Print the run summary as JSON instead of key=value lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Add a hashed column using md5(lower(provider)|lower(game_id))
    Hash {
        /// Input catalog CSV (default: games.csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output CSV (default: generated/hashed.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Convert downloaded_file images to <out-dir>/<hashed>.jpg
    ConvertMatched {
        /// Hashed CSV, relative to --base-dir (default: generated/hashed.csv)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Base directory for downloaded_file paths (default: current dir)
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Output directory, relative to --base-dir (default: generated/s3)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Process only the first N rows with a downloaded_file (0 means all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Count and log planned conversions without running the resizer
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Resize fallback images into the output directory, keeping file names
    ConvertFallbacks {
        /// Base directory for --src-dir/--out-dir (default: current dir)
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Source directory (default: assets/Fallbacks)
        #[arg(long)]
        src_dir: Option<PathBuf>,
        /// Output directory (default: generated/s3)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Process only the first N images (0 means all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Count and log planned conversions without running the resizer
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Generate the thumbnail URL UPDATE script
    UpdateSql {
        /// three-way joins the platform export; direct reads id+hashed
        #[arg(long, value_enum, default_value_t = ModeArg::ThreeWay)]
        mode: ModeArg,
        /// Platform export CSV with id, provider, game_id
        /// (default: platform_games_export_2026-02-27_162847.csv)
        #[arg(long)]
        platform_csv: Option<PathBuf>,
        /// Hashed CSV (default: generated/hashed.csv)
        #[arg(long)]
        hashed_csv: Option<PathBuf>,
        /// Directory containing <hash>.jpg files (default: generated/s3)
        #[arg(long)]
        s3_dir: Option<PathBuf>,
        /// Output SQL path (default: generated/update_games_thumbnail_url.sql)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Base URL prefix for the thumbnail URL
        #[arg(long)]
        cdn_base: Option<String>,
        /// Target table (default: platform.games)
        #[arg(long)]
        table: Option<String>,
        /// Target column (default: thumbnail_url_hyper)
        #[arg(long)]
        column: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    ThreeWay,
    Direct,
}

fn main() -> Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber reads the filter.
    env::init_env();
    thumbprep::logging::init_tracing("info")?;
    env::bootstrap_cli("thumbprep");

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Commands::Hash { input, output } => {
            let defaults = HashConfig::default();
            let cfg = HashConfig {
                input: input.unwrap_or(defaults.input),
                output: output.unwrap_or(defaults.output),
                format,
            };
            thumbprep::cli::hash::run(cfg)?;
        }
        Commands::ConvertMatched {
            csv,
            base_dir,
            out_dir,
            limit,
            dry_run,
        } => {
            let defaults = MatchedConfig::default();
            let cfg = MatchedConfig {
                csv: csv.unwrap_or(defaults.csv),
                base_dir: base_dir.unwrap_or(defaults.base_dir),
                out_dir: out_dir.unwrap_or(defaults.out_dir),
                limit,
                dry_run,
                format,
            };
            run_matched(cfg)?;
        }
        Commands::ConvertFallbacks {
            base_dir,
            src_dir,
            out_dir,
            limit,
            dry_run,
        } => {
            let defaults = FallbackConfig::default();
            let cfg = FallbackConfig {
                base_dir: base_dir.unwrap_or(defaults.base_dir),
                src_dir: src_dir.unwrap_or(defaults.src_dir),
                out_dir: out_dir.unwrap_or(defaults.out_dir),
                limit,
                dry_run,
                format,
            };
            run_fallbacks(cfg)?;
        }
        Commands::UpdateSql {
            mode,
            platform_csv,
            hashed_csv,
            s3_dir,
            output,
            cdn_base,
            table,
            column,
        } => {
            let defaults = SqlConfig::default();
            let cfg = SqlConfig {
                mode: match mode {
                    ModeArg::ThreeWay => SqlMode::ThreeWay,
                    ModeArg::Direct => SqlMode::Direct,
                },
                platform_csv: platform_csv.unwrap_or(defaults.platform_csv),
                hashed_csv: hashed_csv.unwrap_or(defaults.hashed_csv),
                s3_dir: s3_dir.unwrap_or(defaults.s3_dir),
                output: output.unwrap_or(defaults.output),
                cdn_base: cdn_base.unwrap_or(defaults.cdn_base),
                table: table.unwrap_or(defaults.table),
                column: column.unwrap_or(defaults.column),
                format,
            };
            thumbprep::cli::update_sql::run(cfg)?;
        }
    }
    Ok(())
}
