//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, the user config file,
//! an explicit `--config` file, then `NETLOGO_*` environment variables. CLI
//! flags are applied on top by the binary.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// NetLogo installation directory (`NETLOGO_HOME`).
    #[serde(default)]
    pub home: Option<PathBuf>,

    /// JVM shared library override (`NETLOGO_JVM_PATH`). Falls back to
    /// `JAVA_HOME` discovery, then to the backend's own lookup.
    #[serde(default)]
    pub jvm_path: Option<PathBuf>,

    /// Show the NetLogo desktop window instead of running headless
    /// (`NETLOGO_GUI`).
    #[serde(default)]
    pub gui: bool,

    /// Directory holding model files (`NETLOGO_MODELS_DIR`).
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home: None,
            jvm_path: None,
            gui: false,
            models_dir: default_models_dir(),
            logging: LoggingConfig::default(),
        }
    }
}
