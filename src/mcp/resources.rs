//! Bundled documentation and model source resources.

use crate::error::ApiError;
use crate::models::ModelStore;
use serde_json::{json, Value};

pub const PRIMITIVES_URI: &str = "netlogo://docs/primitives";
pub const PROGRAMMING_URI: &str = "netlogo://docs/programming";
pub const MODEL_URI_PREFIX: &str = "netlogo://models/";
pub const MODEL_URI_TEMPLATE: &str = "netlogo://models/{name}";

const PRIMITIVES: &str = include_str!("../../data/primitives.md");
const PROGRAMMING_GUIDE: &str = include_str!("../../data/programming_guide.md");

struct StaticResource {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    text: &'static str,
}

const STATIC_RESOURCES: &[StaticResource] = &[
    StaticResource {
        uri: PRIMITIVES_URI,
        name: "primitives_reference",
        description: "NetLogo primitives quick reference: commands, reporters and syntax.",
        text: PRIMITIVES,
    },
    StaticResource {
        uri: PROGRAMMING_URI,
        name: "programming_guide",
        description: "NetLogo programming guide: contexts, breeds, variables and control flow.",
        text: PROGRAMMING_GUIDE,
    },
];

/// Contents of a resource read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

impl ResourceContents {
    pub fn to_json(&self) -> Value {
        json!({
            "contents": [{
                "uri": self.uri,
                "mimeType": self.mime_type,
                "text": self.text,
            }]
        })
    }
}

pub fn list_resources() -> Vec<Value> {
    STATIC_RESOURCES
        .iter()
        .map(|resource| {
            json!({
                "uri": resource.uri,
                "name": resource.name,
                "description": resource.description,
                "mimeType": "text/markdown",
            })
        })
        .collect()
}

pub fn list_templates() -> Vec<Value> {
    vec![json!({
        "uriTemplate": MODEL_URI_TEMPLATE,
        "name": "model_source",
        "description": "Source of a model in the models directory (.nlogo, then .nlogox, tried when no extension is given).",
        "mimeType": "text/plain",
    })]
}

/// Resolve and read a resource URI.
pub fn read_resource(uri: &str, store: &ModelStore) -> Result<ResourceContents, ApiError> {
    if let Some(resource) = STATIC_RESOURCES.iter().find(|resource| resource.uri == uri) {
        return Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: "text/markdown",
            text: resource.text.to_string(),
        });
    }
    if let Some(name) = uri.strip_prefix(MODEL_URI_PREFIX) {
        let text = store.read_source(name)?;
        return Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: "text/plain",
            text,
        });
    }
    Err(ApiError::NotFound(format!("Unknown resource: {}", uri)))
}
