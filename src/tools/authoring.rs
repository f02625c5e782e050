//! Opening, creating, saving and listing models.

use super::export::transient_file;
use super::NetLogoTools;
use crate::error::ApiError;
use crate::models::prepare_document;
use std::path::Path;
use tracing::info;

impl NetLogoTools {
    /// Load a model from the models directory, replacing any loaded model.
    pub fn open_model(&self, name: &str) -> Result<String, ApiError> {
        let path = self.store().locate(name)?;
        self.load(&path)?;
        let file_name = path
            .file_name()
            .map(|file| file.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Ok(format!("Model loaded: {}", file_name))
    }

    /// Write `code` to a transient `.nlogox` file and load it.
    pub fn create_model(&self, code: &str) -> Result<String, ApiError> {
        let document = prepare_document(code);
        let path = transient_file(self.transient_dir(), ".nlogox", Some(document.as_bytes()))?;
        self.load(&path)?;
        Ok("Model created and loaded from temp file.".to_string())
    }

    /// Save `code` into the models directory without loading it.
    pub fn save_model(&self, name: &str, code: &str) -> Result<String, ApiError> {
        let path = self.store().save(name, code)?;
        Ok(format!(
            "Model saved to {}\nYou can open this file in NetLogo desktop for live visualization.",
            path.display()
        ))
    }

    /// Every model in the models directory as a JSON array.
    pub fn list_models(&self) -> Result<String, ApiError> {
        let entries = self.store().list()?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    fn load(&self, path: &Path) -> Result<(), ApiError> {
        self.session()
            .with_workspace(|workspace| workspace.open(path).map_err(ApiError::from))?;
        info!(path = %path.display(), "model loaded");
        Ok(())
    }
}
