//! JSON-RPC 2.0 message types for newline-delimited stdio framing.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revisions this server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const RESOURCE_NOT_FOUND: i64 = -32002;

/// A request or notification from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl From<&ApiError> for JsonRpcError {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.rpc_code(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for JsonRpcError {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn from_error(id: Value, err: &ApiError) -> Self {
        let error = JsonRpcError::from(err);
        Self::failure(id, error.code, error.message)
    }
}

/// One decoded input line.
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    /// A response or other message the server does not act on.
    Ignored,
    /// The line could not be used; reply with this error.
    Rejected(JsonRpcResponse),
}

/// Decode one line of input. Blank lines are ignored.
pub fn decode_line(line: &str) -> Incoming {
    let line = line.trim();
    if line.is_empty() {
        return Incoming::Ignored;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            return Incoming::Rejected(JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    };

    let Some(object) = value.as_object() else {
        return Incoming::Rejected(JsonRpcResponse::failure(
            Value::Null,
            INVALID_REQUEST,
            "Invalid request: expected a JSON object",
        ));
    };
    let id = object.get("id").cloned().unwrap_or(Value::Null);
    if !object.contains_key("method") {
        // Replies to server-initiated requests carry result or error.
        if object.contains_key("result") || object.contains_key("error") {
            return Incoming::Ignored;
        }
        return Incoming::Rejected(JsonRpcResponse::failure(
            id,
            INVALID_REQUEST,
            "Invalid request: missing method",
        ));
    }

    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(request) if request.jsonrpc == JSONRPC_VERSION => Incoming::Request(request),
        Ok(_) => Incoming::Rejected(JsonRpcResponse::failure(
            id,
            INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"",
        )),
        Err(e) => Incoming::Rejected(JsonRpcResponse::failure(
            id,
            INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )),
    }
}

/// The version to answer `initialize` with: the client's when supported,
/// otherwise the newest this server speaks.
pub fn negotiate_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|version| {
            SUPPORTED_PROTOCOL_VERSIONS
                .iter()
                .find(|supported| **supported == version)
                .copied()
        })
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}
