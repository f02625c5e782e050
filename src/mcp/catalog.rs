//! Tool descriptors advertised by `tools/list`.

use crate::tools::TOOL_NAMES;
use serde_json::{json, Value};

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn descriptor(name: &str) -> Option<Value> {
    let (description, schema) = match name {
        "open_model" => (
            "Open an existing .nlogo or .nlogox model from the models directory.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Model name inside the models directory, as listed by list_models; .nlogo, then .nlogox, is tried when no extension is given."
                    }
                },
                "required": ["path"]
            }),
        ),
        "create_model" => (
            "Create a new NetLogo model from code and load it. Bare procedures are wrapped in a .nlogox envelope automatically; a full .nlogox document is used as is.",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string", "description": "NetLogo procedures or a full .nlogox XML document." }
                },
                "required": ["code"]
            }),
        ),
        "save_model" => (
            "Save NetLogo model code to a .nlogox file in the models directory so it can be opened in the NetLogo desktop application.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "File name without path separators; .nlogox is appended when missing." },
                    "code": { "type": "string", "description": "NetLogo procedures or a full .nlogox XML document." }
                },
                "required": ["name", "code"]
            }),
        ),
        "list_models" => (
            "List the model files in the models directory as a JSON array of {name, path, size}, size in bytes.",
            no_arguments(),
        ),
        "command" => (
            "Execute a NetLogo command, e.g. 'setup', 'go' or 'create-turtles 10'.",
            json!({
                "type": "object",
                "properties": {
                    "netlogo_command": { "type": "string", "description": "The NetLogo command to execute." }
                },
                "required": ["netlogo_command"]
            }),
        ),
        "report" => (
            "Evaluate a NetLogo reporter expression and return its value as JSON.",
            json!({
                "type": "object",
                "properties": {
                    "reporter": { "type": "string", "description": "A reporter such as 'count turtles' or 'mean [energy] of turtles'." }
                },
                "required": ["reporter"]
            }),
        ),
        "run_simulation" => (
            "Run the simulation for N ticks and collect reporter values after each tick. Returns a markdown table.",
            json!({
                "type": "object",
                "properties": {
                    "ticks": { "type": "integer", "minimum": 1, "maximum": 10000, "description": "Number of ticks to run." },
                    "reporters": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "description": "Reporters to collect each tick."
                    },
                    "go_command": { "type": "string", "default": "go", "description": "Command that advances one tick." }
                },
                "required": ["ticks", "reporters"]
            }),
        ),
        "set_parameter" => (
            "Set a global variable, slider or switch to a number, boolean or string.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Global variable name, e.g. 'initial-number-sheep'." },
                    "value": { "type": ["number", "boolean", "string"], "description": "The value to assign." }
                },
                "required": ["name", "value"]
            }),
        ),
        "get_world_state" => (
            "Report the tick count, turtle, patch and link counts, and the world bounds as JSON.",
            no_arguments(),
        ),
        "get_patch_data" => (
            "Report a patch variable over the whole world as a 2D JSON array: rows run from the top (max-pycor) down, columns from min-pxcor right.",
            json!({
                "type": "object",
                "properties": {
                    "attribute": { "type": "string", "description": "Patch variable, e.g. 'pcolor' or 'grass'." }
                },
                "required": ["attribute"]
            }),
        ),
        "export_view" => (
            "Export the current view as a PNG image.",
            no_arguments(),
        ),
        "export_world" => (
            "Export the full world state (turtles, patches, links) to a CSV file and return its path.",
            no_arguments(),
        ),
        _ => return None,
    };
    Some(json!({
        "name": name,
        "description": description,
        "inputSchema": schema,
    }))
}

/// Descriptors for every tool, in advertised order.
pub fn tool_descriptors() -> Vec<Value> {
    TOOL_NAMES.iter().filter_map(|name| descriptor(name)).collect()
}
