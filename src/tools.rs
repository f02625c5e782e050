//! The tool layer
//!
//! Translates named tool calls into calls against the shared workspace.
//! Every operation validates its inputs, runs against the session, normalizes
//! engine values to JSON and reports failures as [`ApiError`].

pub mod authoring;
pub mod export;
pub mod simulation;
pub mod table;
pub mod world;

pub use simulation::ParameterValue;

use crate::engine::Normalizer;
use crate::error::ApiError;
use crate::models::ModelStore;
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Names of every tool, in the order they are advertised.
pub const TOOL_NAMES: &[&str] = &[
    "open_model",
    "create_model",
    "save_model",
    "list_models",
    "command",
    "report",
    "run_simulation",
    "set_parameter",
    "get_world_state",
    "get_patch_data",
    "export_view",
    "export_world",
];

/// Result of a successful tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    /// An exported image plus the file it was written to.
    Image {
        data: Vec<u8>,
        mime_type: &'static str,
        path: PathBuf,
    },
}

impl ToolOutput {
    /// Text payload, if this is a text result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Image { .. } => None,
        }
    }
}

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    OpenModel { path: String },
    CreateModel { code: String },
    SaveModel { name: String, code: String },
    ListModels,
    Command { netlogo_command: String },
    Report { reporter: String },
    RunSimulation {
        ticks: i64,
        reporters: Vec<String>,
        go_command: Option<String>,
    },
    SetParameter { name: String, value: Value },
    GetWorldState,
    GetPatchData { attribute: String },
    ExportView,
    ExportWorld,
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Deserialize)]
struct CodeArgs {
    code: String,
}

#[derive(Deserialize)]
struct SaveArgs {
    name: String,
    code: String,
}

#[derive(Deserialize)]
struct CommandArgs {
    netlogo_command: String,
}

#[derive(Deserialize)]
struct ReportArgs {
    reporter: String,
}

#[derive(Deserialize)]
struct RunArgs {
    ticks: i64,
    reporters: Vec<String>,
    #[serde(default)]
    go_command: Option<String>,
}

#[derive(Deserialize)]
struct SetArgs {
    name: String,
    value: Value,
}

#[derive(Deserialize)]
struct PatchArgs {
    attribute: String,
}

fn args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ApiError> {
    serde_json::from_value(arguments)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid arguments for {}: {}", tool, e)))
}

impl ToolCall {
    /// Parse a tool name and its JSON arguments. Absent arguments are
    /// treated as an empty object.
    pub fn parse(name: &str, arguments: Option<Value>) -> Result<Self, ApiError> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value) => value,
        };
        let call = match name {
            "open_model" => {
                let a: PathArgs = args(name, arguments)?;
                ToolCall::OpenModel { path: a.path }
            }
            "create_model" => {
                let a: CodeArgs = args(name, arguments)?;
                ToolCall::CreateModel { code: a.code }
            }
            "save_model" => {
                let a: SaveArgs = args(name, arguments)?;
                ToolCall::SaveModel {
                    name: a.name,
                    code: a.code,
                }
            }
            "list_models" => ToolCall::ListModels,
            "command" => {
                let a: CommandArgs = args(name, arguments)?;
                ToolCall::Command {
                    netlogo_command: a.netlogo_command,
                }
            }
            "report" => {
                let a: ReportArgs = args(name, arguments)?;
                ToolCall::Report {
                    reporter: a.reporter,
                }
            }
            "run_simulation" => {
                let a: RunArgs = args(name, arguments)?;
                ToolCall::RunSimulation {
                    ticks: a.ticks,
                    reporters: a.reporters,
                    go_command: a.go_command,
                }
            }
            "set_parameter" => {
                let a: SetArgs = args(name, arguments)?;
                ToolCall::SetParameter {
                    name: a.name,
                    value: a.value,
                }
            }
            "get_world_state" => ToolCall::GetWorldState,
            "get_patch_data" => {
                let a: PatchArgs = args(name, arguments)?;
                ToolCall::GetPatchData {
                    attribute: a.attribute,
                }
            }
            "export_view" => ToolCall::ExportView,
            "export_world" => ToolCall::ExportWorld,
            other => return Err(ApiError::InvalidInput(format!("Unknown tool: {}", other))),
        };
        Ok(call)
    }
}

/// Tool operations over one shared session.
#[derive(Clone)]
pub struct NetLogoTools {
    session: Arc<Session>,
    store: ModelStore,
    normalizer: Normalizer,
    transient_dir: PathBuf,
}

impl NetLogoTools {
    pub fn new(session: Arc<Session>, store: ModelStore) -> Self {
        Self {
            session,
            store,
            normalizer: Normalizer::standard(),
            transient_dir: std::env::temp_dir(),
        }
    }

    /// Directory for created models and exports. Defaults to the system
    /// temporary directory.
    pub fn with_transient_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transient_dir = dir.into();
        self
    }

    pub fn transient_dir(&self) -> &Path {
        &self.transient_dir
    }

    /// Replace the value normalizer, e.g. one with extra converters
    /// registered.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Run a parsed tool call.
    pub fn call(&self, call: ToolCall) -> Result<ToolOutput, ApiError> {
        let text = match call {
            ToolCall::OpenModel { path } => self.open_model(&path)?,
            ToolCall::CreateModel { code } => self.create_model(&code)?,
            ToolCall::SaveModel { name, code } => self.save_model(&name, &code)?,
            ToolCall::ListModels => self.list_models()?,
            ToolCall::Command { netlogo_command } => self.command(&netlogo_command)?,
            ToolCall::Report { reporter } => self.report(&reporter)?,
            ToolCall::RunSimulation {
                ticks,
                reporters,
                go_command,
            } => self.run_steps(ticks, &reporters, go_command.as_deref())?,
            ToolCall::SetParameter { name, value } => {
                let value = ParameterValue::from_json(&value)?;
                self.set_variable(&name, &value)?
            }
            ToolCall::GetWorldState => self.world_state()?,
            ToolCall::GetPatchData { attribute } => self.patch_grid(&attribute)?,
            ToolCall::ExportView => return self.export_view(),
            ToolCall::ExportWorld => self.export_world()?,
        };
        Ok(ToolOutput::Text(text))
    }
}

/// Render text as an engine string literal.
pub fn string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for ch in text.chars() {
        match ch {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            other => literal.push(other),
        }
    }
    literal.push('"');
    literal
}
