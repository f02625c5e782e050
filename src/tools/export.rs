//! View and world exports to transient files.

use super::{string_literal, NetLogoTools, ToolOutput};
use crate::error::ApiError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PNG_MIME_TYPE: &str = "image/png";

/// Create a file in `dir` that outlives this call, optionally filled with
/// `contents`.
pub fn transient_file(dir: &Path, suffix: &str, contents: Option<&[u8]>) -> Result<PathBuf, ApiError> {
    let mut file = tempfile::Builder::new()
        .prefix("netlogo-mcp-")
        .suffix(suffix)
        .tempfile_in(dir)?;
    if let Some(contents) = contents {
        file.write_all(contents)?;
        file.flush()?;
    }
    let (_, path) = file
        .keep()
        .map_err(|e| ApiError::StorageError(format!("Failed to keep transient file: {}", e)))?;
    Ok(path)
}

/// A path as the engine expects it inside a string literal: forward slashes
/// on every platform.
pub fn engine_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl NetLogoTools {
    /// Export the view to a PNG and return its bytes.
    pub fn export_view(&self) -> Result<ToolOutput, ApiError> {
        let (path, data) = self.session().with_model(|workspace| {
            let path = transient_file(self.transient_dir(), ".png", None)?;
            let statement = format!("export-view {}", string_literal(&engine_path(&path)));
            workspace.command(&statement)?;
            let data = std::fs::read(&path).map_err(|e| {
                ApiError::StorageError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok((path, data))
        })?;
        info!(path = %path.display(), bytes = data.len(), "view exported");
        Ok(ToolOutput::Image {
            data,
            mime_type: PNG_MIME_TYPE,
            path,
        })
    }

    /// Export the whole world to CSV.
    pub fn export_world(&self) -> Result<String, ApiError> {
        let exported = self.session().with_model(|workspace| {
            let path = transient_file(self.transient_dir(), ".csv", None)?;
            let exported = engine_path(&path);
            workspace.command(&format!("export-world {}", string_literal(&exported)))?;
            Ok(exported)
        })?;
        info!(path = %exported, "world exported");
        Ok(format!("World exported to {}", exported))
    }
}
