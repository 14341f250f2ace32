use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Thumbnail encoding parameters handed to the resize collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    /// Maximum width in pixels (`<w>x>` geometry). Height is unconstrained and
    /// images are only ever shrunk.
    pub max_width: u32,
    pub quality: u8,
    pub strip_metadata: bool,
    pub progressive: bool,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            max_width: 300,
            quality: 80,
            strip_metadata: true,
            progressive: true,
        }
    }
}

/// Converts one image file into one thumbnail. `Err` carries the
/// collaborator's diagnostic text.
pub trait Resizer {
    fn resize(&self, src: &Path, dst: &Path, params: &ResizeParams) -> Result<(), String>;
}

/// Shells out to ImageMagick. Blocking, no timeout.
#[derive(Debug, Clone)]
pub struct MagickResizer {
    program: String,
}

impl MagickResizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `THUMBPREP_MAGICK_BIN` when set, else `magick`.
    pub fn from_env() -> Self {
        Self::new(crate::util::env::magick_bin())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Checks if the executable is reachable on PATH.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn command(&self, src: &Path, dst: &Path, params: &ResizeParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(src)
            .arg("-resize")
            .arg(format!("{}x>", params.max_width))
            .arg("-quality")
            .arg(params.quality.to_string());
        if params.strip_metadata {
            cmd.arg("-strip");
        }
        if params.progressive {
            cmd.args(["-interlace", "Plane"]);
        }
        cmd.arg(dst);
        cmd
    }
}

impl Default for MagickResizer {
    fn default() -> Self {
        Self::new("magick")
    }
}

impl Resizer for MagickResizer {
    fn resize(&self, src: &Path, dst: &Path, params: &ResizeParams) -> Result<(), String> {
        let output = self
            .command(src, dst, params)
            .output()
            .map_err(|e| format!("failed to execute {}: {}", self.program, e))?;

        if output.status.success() {
            debug!(src = %src.display(), dst = %dst.display(), "resized");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(diagnostic)
    }
}

/// First `max` characters of a diagnostic.
pub fn truncate_reason(reason: &str, max: usize) -> String {
    reason.chars().take(max).collect()
}
