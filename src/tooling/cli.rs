//! CLI Tooling
//!
//! Argument parsing, configuration overrides and the `serve`, `check` and
//! `models` commands.

use crate::config::{paths, ConfigLoader, ServerConfig};
use crate::error::ApiError;
use crate::logging::{describe_destination, validate_logging};
use crate::mcp::{serve_stdio, McpServer};
use crate::models::ModelStore;
use crate::session::{engine_settings, Session};
use crate::tools::NetLogoTools;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// NetLogo MCP server - drive a NetLogo workspace from an LLM agent
#[derive(Debug, Parser)]
#[command(name = "netlogo-mcp", version)]
#[command(about = "Model Context Protocol server for the NetLogo agent-based modeling engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (replaces the user config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding model files
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    /// Open the NetLogo desktop window instead of running headless
    #[arg(long, global = true)]
    pub gui: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Start the NetLogo workspace and serve MCP over stdio (default)
    Serve,
    /// Validate configuration without starting the JVM
    Check,
    /// List the models directory
    Models,
}

impl Cli {
    /// The subcommand to run; `serve` when none is given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }

    /// Load layered configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<ServerConfig, ApiError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Flags win over every other source.
    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(dir) = &self.models_dir {
            config.models_dir = dir.clone();
        }
        if self.gui {
            config.gui = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// One checked setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub setting: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Result of `check`.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub resolved: String,
    pub items: Vec<CheckItem>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.items.iter().all(|item| item.ok)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n\n", "Resolved configuration".bold().underline()));
        out.push_str(&self.resolved);
        out.push_str(&format!("\n{}\n\n", "Status".bold().underline()));

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Setting", "Status", "Detail"]);
        for item in &self.items {
            let status = if item.ok {
                format!("{}", "ok".green())
            } else {
                format!("{}", "error".red())
            };
            table.add_row(vec![item.setting.to_string(), status, item.detail.clone()]);
        }
        out.push_str(&format!("{}\n", table));
        out
    }
}

fn check_item<T>(
    setting: &'static str,
    result: Result<T, ApiError>,
    ok: impl FnOnce(T) -> String,
) -> CheckItem {
    match result {
        Ok(value) => CheckItem {
            setting,
            ok: true,
            detail: ok(value),
        },
        Err(err) => CheckItem {
            setting,
            ok: false,
            detail: err.to_string(),
        },
    }
}

/// Commands that run against a resolved configuration.
pub struct CliContext {
    config: ServerConfig,
    config_file: Option<PathBuf>,
}

impl CliContext {
    pub fn new(config: ServerConfig, explicit_config: Option<PathBuf>) -> Self {
        let config_file = explicit_config.or_else(paths::user_config_file);
        Self {
            config,
            config_file,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Validate every setting without starting the engine.
    pub fn check(&self) -> CheckReport {
        let resolved = toml::to_string_pretty(&self.config)
            .unwrap_or_else(|e| format!("# could not render configuration: {}\n", e));

        let mut items = Vec::new();
        items.push(CheckItem {
            setting: "config file",
            ok: true,
            detail: match &self.config_file {
                Some(path) if path.is_file() => path.display().to_string(),
                Some(path) => format!("{} (not present, defaults used)", path.display()),
                None => "none".to_string(),
            },
        });

        match engine_settings(&self.config) {
            Ok(settings) => {
                items.push(CheckItem {
                    setting: "NETLOGO_HOME",
                    ok: true,
                    detail: settings.home.display().to_string(),
                });
                items.push(CheckItem {
                    setting: "JVM library",
                    ok: true,
                    detail: settings
                        .jvm_path
                        .as_ref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "auto-discover".to_string()),
                });
                items.push(CheckItem {
                    setting: "mode",
                    ok: true,
                    detail: settings.mode_label().to_string(),
                });
            }
            Err(err) => items.push(CheckItem {
                setting: "NETLOGO_HOME",
                ok: false,
                detail: err.to_string(),
            }),
        }

        let store = ModelStore::open(&self.config.models_dir);
        items.push(check_item(
            "models directory",
            store.and_then(|store| {
                let count = store.list()?.len();
                Ok((store.root().to_path_buf(), count))
            }),
            |(root, count)| format!("{} ({} models)", root.display(), count),
        ));

        items.push(check_item(
            "logging",
            validate_logging(&self.config.logging)
                .and_then(|_| describe_destination(&self.config.logging)),
            |destination| {
                format!(
                    "{} {} to {}",
                    self.config.logging.level, self.config.logging.format, destination
                )
            },
        ));

        CheckReport { resolved, items }
    }

    /// The models directory listing as a table.
    pub fn models(&self) -> Result<String, ApiError> {
        let store = ModelStore::open(&self.config.models_dir)?;
        let entries = store.list()?;
        if entries.is_empty() {
            return Ok(format!("No models in {}", store.root().display()));
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Size (bytes)", "Path"]);
        for entry in &entries {
            let relative = entry
                .path
                .strip_prefix(store.root())
                .unwrap_or(&entry.path)
                .display()
                .to_string();
            table.add_row(vec![entry.name.clone(), entry.size.to_string(), relative]);
        }
        Ok(format!("{}\n\n{}", store.root().display(), table))
    }

    /// Start the workspace and serve stdio until input ends, then shut the
    /// workspace down.
    pub fn serve(&self) -> Result<(), ApiError> {
        let store = ModelStore::open(&self.config.models_dir)?;
        info!(models_dir = %store.root().display(), "Models directory ready");
        let session = Arc::new(Session::start(&self.config)?);
        let tools = NetLogoTools::new(Arc::clone(&session), store);
        let server = Arc::new(McpServer::new(tools));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        let result = runtime.block_on(serve_stdio(server));
        session.shutdown();
        result
    }
}
