//! Error types for the NetLogo MCP server.
//!
//! Every failure that crosses the protocol boundary is an [`ApiError`]. Its
//! `Display` output is the human-readable message handed to the caller.

use thiserror::Error;

/// Hint appended to every engine-reported failure.
pub const DOCS_HINT: &str =
    "Tip: consult the netlogo://docs/primitives resource for correct NetLogo syntax.";

/// Fixed guidance when an operation needs a model and none is loaded.
pub const NO_MODEL_MESSAGE: &str = "No model is loaded. Use open_model or create_model first.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing installation settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A model name broke a path-safety rule. Raised before any I/O.
    #[error("{0}")]
    PathViolation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", NO_MODEL_MESSAGE)]
    NoModelLoaded,

    /// Failure reported by the engine, wrapper prefixes already stripped.
    #[error("NetLogo error: {message}\n\n{}", DOCS_HINT)]
    EngineError { message: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("NetLogo workspace is not initialized.")]
    WorkspaceUnavailable,

    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl ApiError {
    /// JSON-RPC error code used when this error is reported as a protocol error
    /// rather than as a failed tool result.
    pub fn rpc_code(&self) -> i64 {
        match self {
            ApiError::PathViolation(_) | ApiError::InvalidInput(_) => -32602,
            ApiError::NotFound(_) => -32002,
            ApiError::ProtocolError(_) => -32600,
            _ => -32603,
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ProtocolError(err.to_string())
    }
}
