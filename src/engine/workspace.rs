//! The workspace trait and the settings needed to launch one.

use super::failure::EngineFailure;
use super::value::EngineValue;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A live connection to one engine instance.
///
/// Implementations are not required to be safe for concurrent use; the
/// session serializes every call behind a single lock.
pub trait Workspace: Send {
    /// Load a model document, replacing any model already loaded.
    fn open(&mut self, path: &Path) -> Result<(), EngineFailure>;

    /// Run a command for its side effect.
    fn command(&mut self, source: &str) -> Result<(), EngineFailure>;

    /// Evaluate a reporter and return its value.
    fn report(&mut self, source: &str) -> Result<EngineValue, EngineFailure>;

    /// Release the workspace. Called at most once.
    fn dispose(&mut self) -> Result<(), EngineFailure>;
}

/// Validated launch settings for the engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSettings {
    /// NetLogo installation directory.
    pub home: PathBuf,
    /// Explicit JVM shared library. `None` lets the backend locate one.
    pub jvm_path: Option<PathBuf>,
    /// Open the desktop application instead of a headless workspace.
    pub gui: bool,
}

impl EngineSettings {
    pub fn mode_label(&self) -> &'static str {
        if self.gui {
            "GUI (live window)"
        } else {
            "headless"
        }
    }
}
