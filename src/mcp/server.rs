//! Request dispatch and the stdio serving loop.

use super::catalog::tool_descriptors;
use super::prompts::{get_prompt, list_prompts};
use super::protocol::{
    decode_line, negotiate_version, Incoming, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use super::resources::{list_resources, list_templates, read_resource};
use crate::error::ApiError;
use crate::tools::{NetLogoTools, ToolCall, ToolOutput, TOOL_NAMES};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "netlogo-mcp";

pub const INSTRUCTIONS: &str = "This server lets you create, run, and analyze NetLogo agent-based \
models. Use open_model or create_model first, then command/report to interact. Consult \
netlogo://docs/primitives for syntax help.";

/// Outcome of dispatching one method.
type Dispatch = Result<Value, JsonRpcError>;

fn invalid_params(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError {
        code: INVALID_PARAMS,
        message: message.into(),
    }
}

fn string_param<'a>(params: Option<&'a Value>, key: &str) -> Result<&'a str, JsonRpcError> {
    params
        .and_then(|params| params.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_params(format!("Missing string parameter '{}'", key)))
}

pub struct McpServer {
    tools: NetLogoTools,
}

impl McpServer {
    pub fn new(tools: NetLogoTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &NetLogoTools {
        &self.tools
    }

    /// Handle one request. Returns `None` for notifications. May block on
    /// the engine.
    pub fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };
        debug!(method = %request.method, id = %id, "request");
        let response = match self.dispatch(&request.method, request.params.as_ref()) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                debug!(method = %request.method, code = error.code, error = %error.message, "request failed");
                JsonRpcResponse::failure(id, error.code, error.message)
            }
        };
        Some(response)
    }

    fn dispatch(&self, method: &str, params: Option<&Value>) -> Dispatch {
        match method {
            "initialize" => Ok(self.initialize(params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_descriptors() })),
            "tools/call" => self.call_tool(params),
            "resources/list" => Ok(json!({ "resources": list_resources() })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": list_templates() })),
            "resources/read" => {
                let uri = string_param(params, "uri")?;
                Ok(read_resource(uri, self.tools.store())?.to_json())
            }
            "prompts/list" => Ok(json!({ "prompts": list_prompts() })),
            "prompts/get" => {
                let name = string_param(params, "name")?;
                let arguments = params.and_then(|params| params.get("arguments"));
                Ok(get_prompt(name, arguments)?)
            }
            other => Err(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", other),
            }),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|params| params.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = negotiate_version(requested);
        info!(requested = ?requested, version, "client initialized session");
        json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "prompts": { "listChanged": false },
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "instructions": INSTRUCTIONS,
        })
    }

    fn call_tool(&self, params: Option<&Value>) -> Dispatch {
        let name = string_param(params, "name")?;
        if !TOOL_NAMES.contains(&name) {
            return Err(invalid_params(format!("Unknown tool: {}", name)));
        }
        let arguments = params.and_then(|params| params.get("arguments")).cloned();
        let outcome = ToolCall::parse(name, arguments).and_then(|call| self.tools.call(call));
        Ok(match outcome {
            Ok(output) => tool_result(output),
            Err(err) => {
                warn!(tool = name, error = %err, "tool call failed");
                json!({
                    "content": [{ "type": "text", "text": err.to_string() }],
                    "isError": true,
                })
            }
        })
    }
}

fn tool_result(output: ToolOutput) -> Value {
    match output {
        ToolOutput::Text(text) => json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false,
        }),
        ToolOutput::Image {
            data,
            mime_type,
            path,
        } => json!({
            "content": [
                { "type": "image", "data": BASE64.encode(&data), "mimeType": mime_type },
                { "type": "text", "text": format!("View exported to {}", path.display()) },
            ],
            "isError": false,
        }),
    }
}

fn dispatch_line(
    server: &Arc<McpServer>,
    tx: &mpsc::UnboundedSender<JsonRpcResponse>,
    in_flight: &mut JoinSet<()>,
    line: &str,
) {
    match decode_line(line) {
        Incoming::Request(request) => {
            let server = Arc::clone(server);
            let tx = tx.clone();
            in_flight.spawn_blocking(move || {
                if let Some(response) = server.handle(request) {
                    let _ = tx.send(response);
                }
            });
        }
        Incoming::Ignored => {}
        Incoming::Rejected(response) => {
            warn!(line = %line.trim(), "rejected input line");
            let _ = tx.send(response);
        }
    }
}

/// Serve newline-delimited JSON-RPC from `reader` to `writer` until end of
/// input. Each request runs on the blocking pool; a single task writes the
/// responses. Returns the writer once every in-flight request has answered.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> Result<W, ApiError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_vec(&response)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok::<W, ApiError>(writer)
    });

    let mut reader = reader;
    let mut buf = Vec::new();
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                // Bytes from a cancelled read stay in `buf`.
                if read? == 0 && buf.is_empty() {
                    break;
                }
                let raw = std::mem::take(&mut buf);
                match String::from_utf8(raw) {
                    Ok(line) => dispatch_line(&server, &tx, &mut in_flight, &line),
                    Err(e) => {
                        warn!(error = %e, "input line is not UTF-8");
                        let _ = tx.send(JsonRpcResponse::failure(
                            Value::Null,
                            PARSE_ERROR,
                            format!("Parse error: {}", e),
                        ));
                    }
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "request task failed");
                }
            }
        }
    }

    debug!(pending = in_flight.len(), "input closed, draining requests");
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "request task failed");
        }
    }
    drop(tx);
    writer_task
        .await
        .map_err(|e| ApiError::ProtocolError(format!("writer task failed: {}", e)))?
}

/// Serve on the process's standard input and output.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<(), ApiError> {
    info!("Serving MCP over stdio");
    let reader = BufReader::new(tokio::io::stdin());
    serve(server, reader, tokio::io::stdout()).await?;
    info!("stdin closed, server loop finished");
    Ok(())
}
