//! Command and reporter forwarding, stepped runs and variable assignment.

use super::{string_literal, table, NetLogoTools};
use crate::engine::{EngineValue, Table, Workspace};
use crate::error::ApiError;
use serde_json::Value;
use tracing::debug;

pub const MIN_TICKS: i64 = 1;
pub const MAX_TICKS: i64 = 10_000;

/// Advance statement used when a run does not name one.
pub const DEFAULT_GO_COMMAND: &str = "go";

/// A value accepted by `set_parameter`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParameterValue {
    /// Accept JSON numbers, booleans and strings. Everything else is an
    /// input error.
    pub fn from_json(value: &Value) -> Result<Self, ApiError> {
        match value {
            Value::Bool(flag) => Ok(ParameterValue::Boolean(*flag)),
            Value::String(text) => Ok(ParameterValue::Text(text.clone())),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Ok(ParameterValue::Integer(int))
                } else if let Some(float) = number.as_f64() {
                    Ok(ParameterValue::Float(float))
                } else {
                    Err(ApiError::InvalidInput(format!(
                        "value {} is not a representable number.",
                        number
                    )))
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => Err(ApiError::InvalidInput(
                "value must be a number, boolean, or string.".to_string(),
            )),
        }
    }

    /// The value as engine source text.
    pub fn render(&self) -> String {
        match self {
            ParameterValue::Boolean(true) => "true".to_string(),
            ParameterValue::Boolean(false) => "false".to_string(),
            ParameterValue::Integer(int) => int.to_string(),
            ParameterValue::Float(float) => float.to_string(),
            ParameterValue::Text(text) => string_literal(text),
        }
    }
}

/// Check run arguments without touching the engine.
pub fn validate_run(ticks: i64, reporters: &[String]) -> Result<(), ApiError> {
    if !(MIN_TICKS..=MAX_TICKS).contains(&ticks) {
        return Err(ApiError::InvalidInput(format!(
            "ticks must be between {} and {}.",
            MIN_TICKS, MAX_TICKS
        )));
    }
    if reporters.is_empty() {
        return Err(ApiError::InvalidInput(
            "reporters list cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

/// Advance `steps` times, sampling every reporter after each advance.
pub fn collect_steps(
    workspace: &mut dyn Workspace,
    steps: usize,
    reporters: &[String],
    go_command: &str,
) -> Result<Table, ApiError> {
    let mut table = Table::new(reporters.to_vec());
    for _ in 0..steps {
        workspace.command(go_command)?;
        let row = reporters
            .iter()
            .map(|reporter| workspace.report(reporter))
            .collect::<Result<Vec<EngineValue>, _>>()?;
        table.push_row(row);
    }
    Ok(table)
}

impl NetLogoTools {
    /// Execute a command against the loaded model.
    pub fn command(&self, source: &str) -> Result<String, ApiError> {
        debug!(command = source, "forwarding command");
        self.session()
            .with_model(|workspace| workspace.command(source).map_err(ApiError::from))?;
        Ok(format!("OK: {}", source))
    }

    /// Evaluate a reporter and return its value as compact JSON.
    pub fn report(&self, source: &str) -> Result<String, ApiError> {
        debug!(reporter = source, "forwarding reporter");
        let value = self
            .session()
            .with_model(|workspace| workspace.report(source).map_err(ApiError::from))?;
        Ok(serde_json::to_string(&self.normalizer().normalize(&value))?)
    }

    /// Run `ticks` steps and return the sampled reporters as a markdown
    /// table. Any failure discards the partial run.
    pub fn run_steps(
        &self,
        ticks: i64,
        reporters: &[String],
        go_command: Option<&str>,
    ) -> Result<String, ApiError> {
        validate_run(ticks, reporters)?;
        let go_command = go_command
            .filter(|command| !command.trim().is_empty())
            .unwrap_or(DEFAULT_GO_COMMAND);
        let steps = ticks as usize;
        debug!(steps, go_command, reporters = reporters.len(), "running simulation");

        let table = self
            .session()
            .with_model(|workspace| collect_steps(workspace, steps, reporters, go_command))?;
        Ok(table::markdown(&table, self.normalizer()))
    }

    /// Assign a global variable through the command path.
    pub fn set_variable(&self, name: &str, value: &ParameterValue) -> Result<String, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput(
                "name cannot be empty.".to_string(),
            ));
        }
        let rendered = value.render();
        let statement = format!("set {} {}", name, rendered);
        debug!(statement = %statement, "setting variable");
        self.session()
            .with_model(|workspace| workspace.command(&statement).map_err(ApiError::from))?;
        Ok(format!("OK: {} = {}", name, rendered))
    }
}
