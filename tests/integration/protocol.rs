use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use netlogo_mcp::mcp::McpServer;
use netlogo_mcp::mcp::serve;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::integration::support::{Harness, PNG_BYTES};

/// Feed `lines` to the server and return the responses keyed by id.
async fn exchange(server: &Arc<McpServer>, lines: &[Value]) -> HashMap<String, Value> {
    let mut input = String::new();
    for line in lines {
        input.push_str(&line.to_string());
        input.push('\n');
    }
    exchange_raw(server, input.as_bytes()).await
}

async fn exchange_raw(server: &Arc<McpServer>, input: &[u8]) -> HashMap<String, Value> {
    let output = serve(Arc::clone(server), input, Vec::new())
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| {
            let response: Value = serde_json::from_str(line).unwrap();
            assert_eq!(response["jsonrpc"], "2.0");
            (response["id"].to_string(), response)
        })
        .collect()
}

fn request(id: i64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

fn tool(id: i64, name: &str, arguments: Value) -> Value {
    request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

fn setup() -> (Arc<McpServer>, Harness) {
    let harness = Harness::new();
    harness.add_model(
        "counter.nlogo",
        "to setup\n  clear-all\n  reset-ticks\nend\nto go\n  tick\nend",
    );
    let server = Arc::new(McpServer::new(harness.tools.clone()));
    (server, harness)
}

#[tokio::test]
async fn initialize_negotiates_and_notifications_stay_silent() {
    let (server, _harness) = setup();
    let responses = exchange(
        &server,
        &[
            request(1, "initialize", json!({ "protocolVersion": "2025-03-26" })),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            request(2, "ping", json!({})),
            request(3, "initialize", json!({ "protocolVersion": "1999-01-01" })),
        ],
    )
    .await;

    assert_eq!(responses.len(), 3);
    let init = &responses["1"]["result"];
    assert_eq!(init["protocolVersion"], "2025-03-26");
    assert_eq!(init["serverInfo"]["name"], "netlogo-mcp");
    assert!(init["capabilities"]["tools"].is_object());
    assert!(init["instructions"].as_str().unwrap().contains("open_model"));
    assert_eq!(responses["2"]["result"], json!({}));
    assert_eq!(responses["3"]["result"]["protocolVersion"], "2025-06-18");
}

#[tokio::test]
async fn listings_cover_tools_resources_and_prompts() {
    let (server, _harness) = setup();
    let responses = exchange(
        &server,
        &[
            request(1, "tools/list", json!({})),
            request(2, "resources/list", json!({})),
            request(3, "resources/templates/list", json!({})),
            request(4, "prompts/list", json!({})),
        ],
    )
    .await;

    let tools = responses["1"]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 12);
    assert!(tools.iter().all(|tool| tool["inputSchema"]["type"] == "object"));

    let uris: Vec<&str> = responses["2"]["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["uri"].as_str().unwrap())
        .collect();
    assert!(uris.contains(&"netlogo://docs/primitives"));
    assert!(uris.contains(&"netlogo://docs/programming"));

    assert_eq!(
        responses["3"]["result"]["resourceTemplates"][0]["uriTemplate"],
        "netlogo://models/{name}"
    );
    assert_eq!(responses["4"]["result"]["prompts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn tool_calls_drive_the_workspace() {
    let (server, harness) = setup();

    let responses = exchange(&server, &[tool(1, "command", json!({ "netlogo_command": "setup" }))]).await;
    assert_eq!(responses["1"]["result"]["isError"], true);
    assert!(text(&responses["1"]).contains("No model is loaded"));

    let responses = exchange(&server, &[tool(2, "open_model", json!({ "path": "counter" }))]).await;
    assert_eq!(responses["2"]["result"]["isError"], false);
    assert_eq!(text(&responses["2"]), "Model loaded: counter.nlogo");

    let responses = exchange(
        &server,
        &[tool(
            3,
            "run_simulation",
            json!({ "ticks": 5, "reporters": ["count turtles"] }),
        )],
    )
    .await;
    assert_eq!(responses["3"]["result"]["isError"], false);
    let table = text(&responses["3"]);
    assert!(table.lines().next().unwrap().contains("count turtles"));
    assert_eq!(table.lines().count(), 7);
    assert_eq!(harness.state.lock().ticks, 5);

    let responses = exchange(&server, &[tool(4, "run_simulation", json!({ "ticks": 0, "reporters": ["x"] }))]).await;
    assert_eq!(responses["4"]["result"]["isError"], true);
    assert_eq!(text(&responses["4"]), "ticks must be between 1 and 10000.");

    let responses = exchange(&server, &[tool(5, "report", json!({}))]).await;
    assert_eq!(responses["5"]["result"]["isError"], true);
    assert!(text(&responses["5"]).starts_with("Invalid arguments for report"));
}

#[tokio::test]
async fn export_view_returns_image_content() {
    let (server, _harness) = setup();
    exchange(&server, &[tool(1, "open_model", json!({ "path": "counter" }))]).await;
    let responses = exchange(&server, &[tool(2, "export_view", json!({}))]).await;

    let content = responses["2"]["result"]["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["mimeType"], "image/png");
    let data = BASE64.decode(content[0]["data"].as_str().unwrap()).unwrap();
    assert_eq!(data, PNG_BYTES);
    assert!(content[1]["text"]
        .as_str()
        .unwrap()
        .starts_with("View exported to "));
}

#[tokio::test]
async fn protocol_errors_use_json_rpc_codes() {
    let (server, _harness) = setup();
    let mut input = String::from("this is not json\n");
    for line in [
        request(1, "bogus/method", json!({})),
        tool(2, "teleport", json!({})),
        request(3, "resources/read", json!({ "uri": "netlogo://models/absent" })),
        request(4, "resources/read", json!({ "uri": "netlogo://models/../etc" })),
        request(5, "prompts/get", json!({ "name": "no_such_prompt" })),
        json!({ "jsonrpc": "1.0", "id": 6, "method": "ping" }),
    ] {
        input.push_str(&line.to_string());
        input.push('\n');
    }
    let responses = exchange_raw(&server, input.as_bytes()).await;

    assert_eq!(responses["null"]["error"]["code"], -32700);
    assert_eq!(responses["1"]["error"]["code"], -32601);
    assert_eq!(responses["1"]["error"]["message"], "Method not found: bogus/method");
    assert_eq!(responses["2"]["error"]["code"], -32602);
    assert_eq!(responses["3"]["error"]["code"], -32002);
    assert_eq!(responses["4"]["error"]["code"], -32602);
    assert_eq!(responses["5"]["error"]["code"], -32602);
    assert_eq!(responses["6"]["error"]["code"], -32600);
}

#[tokio::test]
async fn invalid_utf8_line_does_not_stop_the_server() {
    let (server, _harness) = setup();
    let mut input = b"\xff\xfe\n".to_vec();
    input.extend_from_slice(request(7, "ping", json!({})).to_string().as_bytes());
    input.push(b'\n');
    let responses = exchange_raw(&server, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses["null"]["error"]["code"], -32700);
    assert_eq!(responses["7"]["result"], json!({}));
}

#[tokio::test]
async fn resources_and_prompts_render_content() {
    let (server, _harness) = setup();
    let responses = exchange(
        &server,
        &[
            request(1, "resources/read", json!({ "uri": "netlogo://docs/primitives" })),
            request(2, "resources/read", json!({ "uri": "netlogo://models/counter" })),
            request(
                3,
                "prompts/get",
                json!({ "name": "analyze_model", "arguments": { "model_name": "counter" } }),
            ),
        ],
    )
    .await;

    let docs = &responses["1"]["result"]["contents"][0];
    assert_eq!(docs["mimeType"], "text/markdown");
    assert!(docs["text"].as_str().unwrap().contains("turtle"));

    let model = &responses["2"]["result"]["contents"][0];
    assert!(model["text"].as_str().unwrap().contains("reset-ticks"));

    let prompt = &responses["3"]["result"];
    assert_eq!(prompt["messages"][0]["role"], "user");
    assert!(prompt["messages"][0]["content"]["text"]
        .as_str()
        .unwrap()
        .contains("counter"));
}
