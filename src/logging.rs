//! Logging System
//!
//! Structured logging through `tracing`. Standard output carries protocol
//! frames, so events go to stderr, a file, or both, never stdout.
//!
//! Environment variables win over configuration: `NETLOGO_MCP_LOG` (filter
//! directives), `NETLOGO_MCP_LOG_FORMAT`, `NETLOGO_MCP_LOG_OUTPUT`,
//! `NETLOGO_MCP_LOG_FILE` and `NETLOGO_MCP_LOG_MODULES`
//! (`module=level,module=level`).

use crate::config::paths;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const FILTER_ENV: &str = "NETLOGO_MCP_LOG";
const FORMAT_ENV: &str = "NETLOGO_MCP_LOG_FORMAT";
const OUTPUT_ENV: &str = "NETLOGO_MCP_LOG_OUTPUT";
const FILE_ENV: &str = "NETLOGO_MCP_LOG_FILE";
const MODULES_ENV: &str = "NETLOGO_MCP_LOG_MODULES";

const DEFAULT_LOG_FILE: &str = "netlogo-mcp.log";

/// Logging section of the server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error, off
    #[serde(default = "default_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stderr, file or file+stderr
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file when the output includes a file. Unset means the platform
    /// state directory.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text on stderr.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module levels, e.g. `netlogo_mcp::mcp = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    File,
    FileAndStderr,
}

impl LogDestination {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "stderr" => Ok(LogDestination::Stderr),
            "file" => Ok(LogDestination::File),
            "file+stderr" => Ok(LogDestination::FileAndStderr),
            "stdout" | "both" => Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (stdout carries protocol messages; use 'stderr', 'file', or 'file+stderr')",
                value
            ))),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stderr', 'file', or 'file+stderr')",
                other
            ))),
        }
    }

    pub fn writes_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::FileAndStderr)
    }

    pub fn writes_stderr(self) -> bool {
        matches!(self, LogDestination::Stderr | LogDestination::FileAndStderr)
    }
}

fn env_setting(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn resolve_format(config: &LoggingConfig) -> Result<LogFormat, ApiError> {
    match env_setting(FORMAT_ENV) {
        Some(value) => LogFormat::parse(&value),
        None => LogFormat::parse(&config.format),
    }
}

fn resolve_destination(config: &LoggingConfig) -> Result<LogDestination, ApiError> {
    match env_setting(OUTPUT_ENV) {
        Some(value) => LogDestination::parse(&value),
        None => LogDestination::parse(&config.output),
    }
}

/// Log file path: explicit path, then `NETLOGO_MCP_LOG_FILE`, then config,
/// then the platform state directory.
pub fn resolve_log_file_path(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let non_empty = |path: &PathBuf| !path.as_os_str().is_empty();
    if let Some(path) = explicit.filter(non_empty) {
        return Ok(path);
    }
    if let Some(path) = env_setting(FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = configured.filter(non_empty) {
        return Ok(path);
    }
    let dir = paths::state_dir().ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform state directory for log file".into())
    })?;
    Ok(dir.join(DEFAULT_LOG_FILE))
}

fn directive(spec: &str) -> Result<Directive, ApiError> {
    spec.parse()
        .map_err(|e| ApiError::ConfigError(format!("Invalid log directive '{}': {}", spec, e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(FILTER_ENV) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }
    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in &config.modules {
        filter = filter.add_directive(directive(&format!("{}={}", module, level))?);
    }
    if let Some(modules) = env_setting(MODULES_ENV) {
        for spec in modules.split(',').map(str::trim).filter(|spec| spec.contains('=')) {
            filter = filter.add_directive(directive(spec)?);
        }
    }
    Ok(filter)
}

fn open_log_file(path: &Path) -> Result<Arc<File>, ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create log directory {}: {}", parent.display(), e))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e)))?;
    Ok(Arc::new(file))
}

fn make_writer(config: &LoggingConfig, destination: LogDestination) -> Result<BoxMakeWriter, ApiError> {
    if !destination.writes_file() {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    }
    let file = open_log_file(&resolve_log_file_path(None, config.file.clone())?)?;
    Ok(if destination.writes_stderr() {
        BoxMakeWriter::new(file.and(std::io::stderr))
    } else {
        BoxMakeWriter::new(file)
    })
}

/// Install the global subscriber. `None` uses the defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    let installed = if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
    } else {
        let filter = build_filter(config)?;
        let format = resolve_format(config)?;
        let destination = resolve_destination(config)?;
        let writer = make_writer(config, destination)?;
        let registry = Registry::default().with(filter);
        match format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(writer),
                )
                .try_init(),
            LogFormat::Text => registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(config.color && !destination.writes_file())
                        .with_writer(writer),
                )
                .try_init(),
        }
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

/// Check the format and destination without installing anything.
pub fn validate_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    resolve_format(config)?;
    resolve_destination(config)?;
    Ok(())
}

/// Destination summary for `check`: `stderr`, a file path, or both.
pub fn describe_destination(config: &LoggingConfig) -> Result<String, ApiError> {
    let destination = resolve_destination(config)?;
    if !destination.writes_file() {
        return Ok("stderr".to_string());
    }
    let file = resolve_log_file_path(None, config.file.clone())?;
    if destination.writes_stderr() {
        Ok(format!("{} + stderr", file.display()))
    } else {
        Ok(file.display().to_string())
    }
}
