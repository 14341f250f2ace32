use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use super::resize::{ResizeParams, Resizer};

/// Fake resizer: records calls and writes a placeholder output file,
/// failing for sources whose file name matches `fail_name`.
#[derive(Debug, Default)]
pub struct RecordingResizer {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    fail_name: Option<(String, String)>,
}

impl RecordingResizer {
    pub fn failing_on(name: &str, reason: &str) -> Self {
        Self {
            calls: RefCell::default(),
            fail_name: Some((name.to_string(), reason.to_string())),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl Resizer for RecordingResizer {
    fn resize(&self, src: &Path, dst: &Path, _params: &ResizeParams) -> Result<(), String> {
        self.calls
            .borrow_mut()
            .push((src.to_path_buf(), dst.to_path_buf()));
        if let Some((name, reason)) = &self.fail_name {
            if src.file_name().is_some_and(|n| n == name.as_str()) {
                return Err(reason.clone());
            }
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(dst, b"jpg").map_err(|e| e.to_string())
    }
}
