//! Workspace session
//!
//! Owns the single engine workspace for the lifetime of the process. The
//! workspace is created once by [`Session::start`], shared by every request,
//! and released once by [`Session::shutdown`]. Every access goes through one
//! lock, so operations against the engine are strictly serialized even when
//! requests are dispatched concurrently.

use crate::config::ServerConfig;
use crate::engine::{model_loaded, EngineSettings, Workspace};
use crate::error::ApiError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Candidate JVM library locations relative to `JAVA_HOME`.
const JVM_LIBRARY_CANDIDATES: &[&str] = &[
    "bin/server/jvm.dll",
    "lib/server/libjvm.so",
    "lib/server/libjvm.dylib",
];

pub struct Session {
    workspace: Mutex<Option<Box<dyn Workspace>>>,
}

impl Session {
    /// Wrap an already constructed workspace.
    pub fn new(workspace: Box<dyn Workspace>) -> Self {
        Self {
            workspace: Mutex::new(Some(workspace)),
        }
    }

    /// Validate the engine settings and launch the workspace.
    pub fn start(config: &ServerConfig) -> Result<Self, ApiError> {
        let settings = engine_settings(config)?;
        info!(
            mode = settings.mode_label(),
            home = %settings.home.display(),
            "Starting NetLogo workspace"
        );
        let workspace = launch(&settings)?;
        info!(mode = settings.mode_label(), "NetLogo workspace ready");
        Ok(Self::new(workspace))
    }

    /// Run `f` with exclusive access to the workspace.
    pub fn with_workspace<T>(
        &self,
        f: impl FnOnce(&mut dyn Workspace) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut guard = self.workspace.lock();
        let workspace = guard.as_mut().ok_or(ApiError::WorkspaceUnavailable)?;
        f(workspace.as_mut())
    }

    /// Like [`Session::with_workspace`], but fails with the fixed guidance
    /// message when no model is loaded.
    pub fn with_model<T>(
        &self,
        f: impl FnOnce(&mut dyn Workspace) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        self.with_workspace(|workspace| {
            if !model_loaded(workspace) {
                return Err(ApiError::NoModelLoaded);
            }
            f(workspace)
        })
    }

    pub fn is_running(&self) -> bool {
        self.workspace.lock().is_some()
    }

    /// Release the workspace. Failures are logged and discarded; later calls
    /// are no-ops.
    pub fn shutdown(&self) {
        let Some(mut workspace) = self.workspace.lock().take() else {
            return;
        };
        info!("Shutting down NetLogo workspace");
        if let Err(failure) = workspace.dispose() {
            warn!(error = %failure, "NetLogo workspace did not shut down cleanly");
        }
    }
}

/// Resolve validated engine settings from configuration. Nothing here
/// touches the JVM.
pub fn engine_settings(config: &ServerConfig) -> Result<EngineSettings, ApiError> {
    let home = validate_home(config.home.as_deref())?;
    let jvm_path = config.jvm_path.clone().or_else(|| {
        std::env::var_os("JAVA_HOME")
            .map(PathBuf::from)
            .and_then(|java_home| locate_jvm_library(&java_home))
    });
    Ok(EngineSettings {
        home,
        jvm_path,
        gui: config.gui,
    })
}

fn validate_home(home: Option<&Path>) -> Result<PathBuf, ApiError> {
    let home = match home {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => {
            return Err(ApiError::ConfigError(
                "NETLOGO_HOME is not set. Set it to your NetLogo installation directory, \
                 e.g. /opt/NetLogo 6.4.0"
                    .to_string(),
            ))
        }
    };
    if !home.is_dir() {
        return Err(ApiError::ConfigError(format!(
            "NETLOGO_HOME points to a directory that does not exist: {}",
            home.display()
        )));
    }
    Ok(home.to_path_buf())
}

/// First existing JVM shared library under a Java installation.
pub fn locate_jvm_library(java_home: &Path) -> Option<PathBuf> {
    JVM_LIBRARY_CANDIDATES
        .iter()
        .map(|candidate| java_home.join(candidate))
        .find(|candidate| candidate.exists())
}

#[cfg(feature = "jvm")]
fn launch(settings: &EngineSettings) -> Result<Box<dyn Workspace>, ApiError> {
    let workspace = crate::engine::jvm::JvmWorkspace::launch(settings)?;
    Ok(Box::new(workspace))
}

#[cfg(not(feature = "jvm"))]
fn launch(_settings: &EngineSettings) -> Result<Box<dyn Workspace>, ApiError> {
    Err(ApiError::ConfigError(
        "this build has no JVM backend; rebuild with the `jvm` feature".to_string(),
    ))
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
