//! Model files on disk: listing, reading and saving inside the models
//! directory.

use super::document::prepare_document;
use super::paths::{Access, ModelPaths, MODEL_EXTENSIONS};
use crate::error::ApiError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// One entry of a models listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    /// File stem.
    pub name: String,
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ModelStore {
    paths: ModelPaths,
}

impl ModelStore {
    pub fn open(dir: &Path) -> Result<Self, ApiError> {
        Ok(Self {
            paths: ModelPaths::open(dir)?,
        })
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    /// Model files directly inside the directory, sorted by path. Nested
    /// directories are not listed since names cannot contain separators.
    pub fn list(&self) -> Result<Vec<ModelEntry>, ApiError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(self.root())
            .min_depth(1)
            .max_depth(1)
            .follow_links(false) {
            let entry = entry.map_err(|e| ApiError::StorageError(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_model = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| MODEL_EXTENSIONS.contains(&ext))
                .unwrap_or(false);
            if !is_model {
                continue;
            }
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let size = entry
                .metadata()
                .map_err(|e| ApiError::StorageError(e.to_string()))?
                .len();
            entries.push(ModelEntry {
                name,
                path: path.to_path_buf(),
                size,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = entries.len(), root = %self.root().display(), "listed models");
        Ok(entries)
    }

    /// Resolve a model name for loading.
    pub fn locate(&self, name: &str) -> Result<PathBuf, ApiError> {
        self.paths.resolve(name, Access::Read)
    }

    /// Raw text of a model.
    pub fn read_source(&self, name: &str) -> Result<String, ApiError> {
        let path = self.locate(name)?;
        std::fs::read_to_string(&path).map_err(|e| {
            ApiError::StorageError(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Write `code` as a model document under `name`, wrapping bare
    /// procedure text first. Returns the written path.
    pub fn save(&self, name: &str, code: &str) -> Result<PathBuf, ApiError> {
        let path = self.paths.resolve(name, Access::Write)?;
        let document = prepare_document(code);
        std::fs::write(&path, document).map_err(|e| {
            ApiError::StorageError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "model saved");
        Ok(path)
    }
}
