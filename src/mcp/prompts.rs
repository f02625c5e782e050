//! Prompt templates for common workflows.

use crate::error::ApiError;
use serde_json::{json, Map, Value};

/// Ticks per run suggested by the sweep prompt.
pub const SWEEP_TICKS: u32 = 200;

/// Upper bound on the number of sweep values.
pub const MAX_SWEEP_STEPS: usize = 1_000;

struct PromptArgument {
    name: &'static str,
    description: &'static str,
    required: bool,
}

struct PromptSpec {
    name: &'static str,
    description: &'static str,
    arguments: &'static [PromptArgument],
}

const PROMPTS: &[PromptSpec] = &[
    PromptSpec {
        name: "analyze_model",
        description: "Step-by-step guide to understanding an existing NetLogo model.",
        arguments: &[PromptArgument {
            name: "model_name",
            description: "Name of the model file to analyze.",
            required: true,
        }],
    },
    PromptSpec {
        name: "create_abm",
        description: "Template for building a new agent-based model from scratch.",
        arguments: &[
            PromptArgument {
                name: "description",
                description: "What the model should simulate.",
                required: true,
            },
            PromptArgument {
                name: "agents",
                description: "Types of agents to include, e.g. 'predators, prey'.",
                required: false,
            },
            PromptArgument {
                name: "behaviors",
                description: "Key behaviors agents should exhibit.",
                required: false,
            },
        ],
    },
    PromptSpec {
        name: "parameter_sweep",
        description: "Template for systematic parameter exploration.",
        arguments: &[
            PromptArgument {
                name: "parameter",
                description: "Name of the global variable to sweep.",
                required: true,
            },
            PromptArgument {
                name: "min_val",
                description: "Minimum value for the parameter.",
                required: true,
            },
            PromptArgument {
                name: "max_val",
                description: "Maximum value for the parameter.",
                required: true,
            },
            PromptArgument {
                name: "steps",
                description: "Number of evenly spaced values to test (default 5).",
                required: false,
            },
            PromptArgument {
                name: "metric",
                description: "Reporter measured as the outcome (default 'count turtles').",
                required: false,
            },
        ],
    },
];

pub fn list_prompts() -> Vec<Value> {
    PROMPTS
        .iter()
        .map(|prompt| {
            let arguments: Vec<Value> = prompt
                .arguments
                .iter()
                .map(|argument| {
                    json!({
                        "name": argument.name,
                        "description": argument.description,
                        "required": argument.required,
                    })
                })
                .collect();
            json!({
                "name": prompt.name,
                "description": prompt.description,
                "arguments": arguments,
            })
        })
        .collect()
}

/// Prompt arguments arrive as strings, but numbers are tolerated.
struct Arguments<'a> {
    prompt: &'a str,
    values: Map<String, Value>,
}

impl<'a> Arguments<'a> {
    fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn required(&self, name: &str) -> Result<String, ApiError> {
        self.text(name).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "Missing required argument '{}' for prompt {}",
                name, self.prompt
            ))
        })
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.text(name).unwrap_or_else(|| default.to_string())
    }

    fn number<T: std::str::FromStr>(&self, name: &str, text: &str) -> Result<T, ApiError> {
        text.trim().parse().map_err(|_| {
            ApiError::InvalidInput(format!(
                "Argument '{}' for prompt {} must be a number, got '{}'",
                name, self.prompt, text
            ))
        })
    }
}

/// Evenly spaced sweep values from `min` to `max`, rounded to 4 decimals.
pub fn sweep_values(min: f64, max: f64, steps: usize) -> Vec<f64> {
    let step_size = (max - min) / (steps.saturating_sub(1).max(1)) as f64;
    (0..steps)
        .map(|i| {
            let value = min + i as f64 * step_size;
            (value * 10_000.0).round() / 10_000.0
        })
        .collect()
}

fn analyze_model(args: &Arguments) -> Result<(String, String), ApiError> {
    let model = args.required("model_name")?;
    let text = format!(
        "I want to understand the NetLogo model '{model}'. Please follow these steps:\n\n\
         1. Open the model using the open_model tool with '{model}'.\n\
         2. Read the model source via the netlogo://models/{{name}} resource.\n\
         3. Identify and list:\n\
         \x20  - Global variables and their purposes\n\
         \x20  - Breeds and their breed-specific variables\n\
         \x20  - The setup procedure and the initial state it creates\n\
         \x20  - The go procedure and what happens each tick\n\
         \x20  - Any notable sub-procedures\n\
         4. Run the model: call 'setup', then run_simulation for 100 ticks with relevant reporters (agent counts, key metrics).\n\
         5. Use export_view to show me what the model looks like.\n\
         6. Summarize:\n\
         \x20  - What the model simulates\n\
         \x20  - Key dynamics and emergent behaviors\n\
         \x20  - Interesting parameters to experiment with\n"
    );
    Ok((format!("Analyze the model '{}'", model), text))
}

fn create_abm(args: &Arguments) -> Result<(String, String), ApiError> {
    let description = args.required("description")?;
    let agents = args.or("agents", "turtles");
    let behaviors = args.or("behaviors", "movement, interaction");
    let text = format!(
        "Build a NetLogo agent-based model with this specification:\n\n\
         **Description:** {description}\n\
         **Agent types:** {agents}\n\
         **Key behaviors:** {behaviors}\n\n\
         Please follow these steps:\n\n\
         1. First, read netlogo://docs/primitives and netlogo://docs/programming for reference.\n\
         2. Design the model structure:\n\
         \x20  - Define breeds for each agent type\n\
         \x20  - Define breed-specific and global variables\n\
         \x20  - Plan the setup and go procedures\n\
         3. Write the complete NetLogo code.\n\
         4. Use create_model to load it.\n\
         5. Run 'setup' to initialize.\n\
         6. Use export_view to show the initial state.\n\
         7. Run the simulation for 200 ticks with relevant reporters.\n\
         8. Export the view again to show the evolved state.\n\
         9. Summarize the model's behavior and suggest experiments.\n"
    );
    Ok(("Build a new agent-based model".to_string(), text))
}

fn parameter_sweep(args: &Arguments) -> Result<(String, String), ApiError> {
    let parameter = args.required("parameter")?;
    let min: f64 = args.number("min_val", &args.required("min_val")?)?;
    let max: f64 = args.number("max_val", &args.required("max_val")?)?;
    let steps: usize = match args.text("steps") {
        Some(text) => args.number("steps", &text)?,
        None => 5,
    };
    if !(1..=MAX_SWEEP_STEPS).contains(&steps) {
        return Err(ApiError::InvalidInput(format!(
            "Argument 'steps' for prompt parameter_sweep must be between 1 and {}",
            MAX_SWEEP_STEPS
        )));
    }
    let metric = args.or("metric", "count turtles");
    let values = sweep_values(min, max, steps)
        .iter()
        .map(|value| format!("{:?}", value))
        .collect::<Vec<_>>()
        .join(", ");
    let ticks = SWEEP_TICKS;
    let text = format!(
        "Run a parameter sweep on '{parameter}' to see how it affects '{metric}'.\n\n\
         **Parameter:** {parameter}\n\
         **Values to test:** {values}\n\
         **Metric to measure:** {metric}\n\
         **Ticks per run:** {ticks}\n\n\
         For each value:\n\
         1. Run 'setup' to reset the model.\n\
         2. Set {parameter} to the test value using set_parameter.\n\
         3. Run the simulation for {ticks} ticks.\n\
         4. Record the final value of: {metric}\n\n\
         After all runs:\n\
         5. Present results in a table (parameter value vs final metric).\n\
         6. Describe the relationship: linear, threshold, U-shaped, or something else.\n\
         7. Identify the parameter value that optimizes the metric.\n\
         8. Suggest follow-up experiments.\n"
    );
    Ok((format!("Sweep '{}' against '{}'", parameter, metric), text))
}

/// Render a prompt as a `prompts/get` result.
pub fn get_prompt(name: &str, arguments: Option<&Value>) -> Result<Value, ApiError> {
    let values = match arguments {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(values)) => values.clone(),
        Some(_) => {
            return Err(ApiError::InvalidInput(format!(
                "Arguments for prompt {} must be an object",
                name
            )))
        }
    };
    let args = Arguments {
        prompt: name,
        values,
    };
    let (description, text) = match name {
        "analyze_model" => analyze_model(&args)?,
        "create_abm" => create_abm(&args)?,
        "parameter_sweep" => parameter_sweep(&args)?,
        other => return Err(ApiError::InvalidInput(format!("Unknown prompt: {}", other))),
    };
    Ok(json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text },
        }],
    }))
}
