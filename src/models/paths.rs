//! Model name resolution inside the models directory.
//!
//! Names are checked lexically before the filesystem is touched, then the
//! resolved location is canonicalized and checked again so a symlink inside
//! the directory cannot point a name somewhere else.

use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const LEGACY_EXTENSION: &str = "nlogo";
pub const XML_EXTENSION: &str = "nlogox";

/// Model file extensions the engine loads.
pub const MODEL_EXTENSIONS: &[&str] = &[LEGACY_EXTENSION, XML_EXTENSION];

/// How a resolved model path will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The file must exist and carry a model extension.
    Read,
    /// The file will be created or overwritten.
    Write,
}

impl Access {
    pub fn default_extension(self) -> &'static str {
        match self {
            Access::Read => LEGACY_EXTENSION,
            Access::Write => XML_EXTENSION,
        }
    }
}

/// Reject names that could escape the models directory.
pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::PathViolation(format!(
            "Invalid model name '{}': path separators and '..' are not allowed (path traversal not allowed).",
            name
        )));
    }
    if name.trim().is_empty() {
        return Err(ApiError::PathViolation(
            "Invalid model name: the name is empty.".to_string(),
        ));
    }
    Ok(())
}

fn has_model_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MODEL_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Apply the default extension for `access`. Read access only accepts the
/// model extensions; write access appends `.nlogox` unless already present.
pub fn file_name_for(name: &str, access: Access) -> Result<String, ApiError> {
    match access {
        Access::Read => {
            if has_model_extension(name) {
                Ok(name.to_string())
            } else if Path::new(name).extension().is_none() {
                Ok(format!("{}.{}", name, access.default_extension()))
            } else {
                Err(ApiError::InvalidInput(format!(
                    "Not a .nlogo/.nlogox file: {}",
                    name
                )))
            }
        }
        Access::Write => {
            let suffix = format!(".{}", XML_EXTENSION);
            if name.ends_with(&suffix) {
                Ok(name.to_string())
            } else {
                Ok(format!("{}{}", name, suffix))
            }
        }
    }
}

/// Resolves model names against one canonical models directory.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    root: PathBuf,
}

impl ModelPaths {
    /// Create the directory if needed and canonicalize it.
    pub fn open(dir: &Path) -> Result<Self, ApiError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create models directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        let root = dunce::canonicalize(dir).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to canonicalize models directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a model name to a path inside the models directory.
    pub fn resolve(&self, name: &str, access: Access) -> Result<PathBuf, ApiError> {
        validate_name(name)?;
        let file_name = file_name_for(name, access)?;
        let candidate = self.root.join(&file_name);

        match access {
            Access::Read => {
                let candidate = if candidate.exists() {
                    candidate
                } else {
                    self.other_extension(name).unwrap_or(candidate)
                };
                if !candidate.exists() {
                    return Err(ApiError::NotFound(format!("Model not found: {}", file_name)));
                }
                let resolved = dunce::canonicalize(&candidate)?;
                self.ensure_contained(name, resolved)
            }
            Access::Write => match std::fs::symlink_metadata(&candidate) {
                // A write follows the link, so its target must already
                // resolve inside the directory.
                Ok(meta) if meta.file_type().is_symlink() => match dunce::canonicalize(&candidate) {
                    Ok(resolved) => self.ensure_contained(name, resolved),
                    Err(_) => {
                        warn!(name, link = %candidate.display(), "dangling model symlink");
                        Err(ApiError::PathViolation(format!(
                            "Invalid model name '{}': it is a symlink whose target does not exist (path traversal not allowed).",
                            name
                        )))
                    }
                },
                Ok(_) => {
                    let resolved = dunce::canonicalize(&candidate)?;
                    self.ensure_contained(name, resolved)
                }
                Err(_) => self.ensure_contained(name, candidate),
            },
        }
    }

    /// `name.nlogox` when a bare name has no `.nlogo` file, so every listed
    /// model opens by its stem.
    fn other_extension(&self, name: &str) -> Option<PathBuf> {
        if Path::new(name).extension().is_some() {
            return None;
        }
        Some(self.root.join(format!("{}.{}", name, XML_EXTENSION))).filter(|path| path.exists())
    }

    fn ensure_contained(&self, name: &str, resolved: PathBuf) -> Result<PathBuf, ApiError> {
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            warn!(name, resolved = %resolved.display(), "model path escapes models directory");
            Err(ApiError::PathViolation(format!(
                "Invalid model name '{}': it resolves outside the models directory (path traversal not allowed).",
                name
            )))
        }
    }
}
