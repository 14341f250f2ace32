//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::sync::Once;

use tracing::{debug, info};

static INIT: Once = Once::new();

/// Resize executable override.
pub const MAGICK_BIN_VAR: &str = "THUMBPREP_MAGICK_BIN";
/// Default CDN base for generated thumbnail URLs.
pub const CDN_BASE_VAR: &str = "THUMBPREP_CDN_BASE";
/// Default output directory for converted images.
pub const OUT_DIR_VAR: &str = "THUMBPREP_OUT_DIR";

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            debug!(target = "env", "loaded .env");
        }
    });
}

/// Common bootstrap for the CLI: loads env and logs which overrides are active.
pub fn bootstrap_cli(bin_name: &str) {
    init_env();
    for key in [MAGICK_BIN_VAR, CDN_BASE_VAR, OUT_DIR_VAR] {
        if let Some(v) = env_opt(key) {
            info!(target = "bootstrap", bin = bin_name, key, value = %v, "env override");
        }
    }
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resize executable, `magick` unless overridden.
pub fn magick_bin() -> String {
    env_opt(MAGICK_BIN_VAR).unwrap_or_else(|| "magick".to_string())
}
