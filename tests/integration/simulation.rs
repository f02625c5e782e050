use netlogo_mcp::engine::{EngineValue, Normalizer, ValueShape};
use netlogo_mcp::error::{ApiError, NO_MODEL_MESSAGE};
use netlogo_mcp::tools::{ParameterValue, ToolCall};
use serde_json::{json, Value};

use crate::integration::support::Harness;

fn cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

#[test]
fn model_requiring_tools_fail_without_a_model() {
    let harness = Harness::new();
    let calls = vec![
        ToolCall::Command {
            netlogo_command: "setup".into(),
        },
        ToolCall::Report {
            reporter: "count turtles".into(),
        },
        ToolCall::RunSimulation {
            ticks: 5,
            reporters: vec!["count turtles".into()],
            go_command: None,
        },
        ToolCall::SetParameter {
            name: "flag".into(),
            value: json!(true),
        },
        ToolCall::GetWorldState,
        ToolCall::GetPatchData {
            attribute: "pcolor".into(),
        },
        ToolCall::ExportView,
        ToolCall::ExportWorld,
    ];
    for call in calls {
        let err = harness.tools.call(call.clone()).unwrap_err();
        assert!(matches!(err, ApiError::NoModelLoaded), "{:?}", call);
        assert_eq!(err.to_string(), NO_MODEL_MESSAGE);
    }
    assert!(harness.state.lock().commands.is_empty());
}

#[test]
fn command_and_report_forward_verbatim() {
    let harness = Harness::new();
    harness.load_counter_model();

    assert_eq!(harness.tools.command("setup").unwrap(), "OK: setup");
    assert_eq!(harness.tools.command("go").unwrap(), "OK: go");
    assert_eq!(harness.tools.report("count turtles").unwrap(), "1");
    assert_eq!(harness.tools.report("ticks").unwrap(), "1.0");
    assert_eq!(
        harness.tools.report("sample-list").unwrap(),
        r#"[1,2.5,true,"x",null]"#
    );
}

#[test]
fn engine_failures_drop_wrapper_prefixes() {
    let harness = Harness::new();
    harness.load_counter_model();

    let err = harness.tools.report("foo").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("NetLogo error: Nothing named FOO has been defined."));
    assert!(!message.contains("CompilerException"));
    assert!(message.ends_with(netlogo_mcp::error::DOCS_HINT));

    let err = harness.tools.command("bogus-command").unwrap_err();
    assert!(matches!(err, ApiError::EngineError { .. }));
}

#[test]
fn foreign_values_pass_through_as_text_unless_registered() {
    let harness = Harness::new();
    harness.load_counter_model();
    assert_eq!(harness.tools.report("one-of turtles").unwrap(), r#""(turtle 0)""#);

    let mut normalizer = Normalizer::standard();
    normalizer.register(
        ValueShape::Foreign("org.nlogo.agent.Turtle".to_string()),
        |value: &EngineValue, _: &Normalizer| match value {
            EngineValue::Foreign { repr, .. } => json!({ "agent": repr }),
            _ => Value::Null,
        },
    );
    let harness = Harness::with_normalizer(normalizer);
    harness.load_counter_model();
    assert_eq!(
        harness.tools.report("one-of turtles").unwrap(),
        r#"{"agent":"(turtle 0)"}"#
    );
}

#[test]
fn run_simulation_samples_after_each_step() {
    let harness = Harness::new();
    harness.load_counter_model();
    harness.tools.command("setup").unwrap();

    let table = harness
        .tools
        .run_steps(10, &["count turtles".to_string()], None)
        .unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(cells(lines[0]), vec!["tick", "count turtles"]);
    for (step, line) in lines[2..].iter().enumerate() {
        assert_eq!(
            cells(line),
            vec![step.to_string(), (step + 1).to_string()],
            "row {}",
            step
        );
    }
    let go_count = harness
        .state
        .lock()
        .commands
        .iter()
        .filter(|command| command.as_str() == "go")
        .count();
    assert_eq!(go_count, 10);
}

#[test]
fn run_simulation_uses_custom_advance_statement() {
    let harness = Harness::new();
    harness.load_counter_model();
    harness
        .tools
        .run_steps(
            3,
            &["count turtles".to_string(), "ticks".to_string()],
            Some("tick"),
        )
        .unwrap();
    let state = harness.state.lock();
    assert_eq!(state.ticks, 3);
    assert!(state.commands.iter().all(|command| command != "go"));
}

#[test]
fn run_simulation_rejects_bad_arguments_before_the_engine() {
    let harness = Harness::new();
    harness.load_counter_model();
    let calls_before = harness.state.lock().engine_calls();
    let reporters = vec!["count turtles".to_string()];

    for ticks in [0, -1, 10_001] {
        let err = harness.tools.run_steps(ticks, &reporters, None).unwrap_err();
        assert_eq!(err.to_string(), "ticks must be between 1 and 10000.");
    }
    let err = harness.tools.run_steps(10, &[], None).unwrap_err();
    assert_eq!(err.to_string(), "reporters list cannot be empty.");

    assert_eq!(harness.state.lock().engine_calls(), calls_before);
}

#[test]
fn run_simulation_failure_discards_partial_rows() {
    let harness = Harness::new();
    harness.load_counter_model();
    let err = harness
        .tools
        .run_steps(10, &["unstable".to_string()], None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("NetLogo error: Division by zero.\n\n{}", netlogo_mcp::error::DOCS_HINT)
    );
    assert_eq!(harness.state.lock().ticks, 3);
}

#[test]
fn set_parameter_composes_engine_literals() {
    let harness = Harness::new();
    harness.load_counter_model();

    let output = harness
        .tools
        .set_variable("flag", &ParameterValue::Boolean(true))
        .unwrap();
    assert_eq!(output, "OK: flag = true");
    assert_eq!(harness.last_command().unwrap(), "set flag true");

    let output = harness
        .tools
        .set_variable("label", &ParameterValue::Text("hi".to_string()))
        .unwrap();
    assert_eq!(output, "OK: label = \"hi\"");
    assert_eq!(harness.last_command().unwrap(), "set label \"hi\"");

    let value = ParameterValue::from_json(&json!(0.35)).unwrap();
    harness.tools.set_variable("rate", &value).unwrap();
    assert_eq!(harness.last_command().unwrap(), "set rate 0.35");

    let value = ParameterValue::from_json(&json!(100)).unwrap();
    harness.tools.set_variable("initial-number-sheep", &value).unwrap();
    assert_eq!(harness.last_command().unwrap(), "set initial-number-sheep 100");
}

#[test]
fn set_parameter_escapes_string_literals() {
    let harness = Harness::new();
    harness.load_counter_model();
    harness
        .tools
        .set_variable("label", &ParameterValue::Text("say \"hi\"".to_string()))
        .unwrap();
    assert_eq!(
        harness.last_command().unwrap(),
        "set label \"say \\\"hi\\\"\""
    );
}

#[test]
fn set_parameter_rejects_structured_values() {
    let harness = Harness::new();
    harness.load_counter_model();
    let err = harness
        .tools
        .call(ToolCall::SetParameter {
            name: "flag".into(),
            value: Value::Null,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(harness
        .state
        .lock()
        .commands
        .iter()
        .all(|command| !command.starts_with("set ")));
}

#[test]
fn set_parameter_surfaces_unknown_variables() {
    let harness = Harness::new();
    harness.load_counter_model();
    let err = harness
        .tools
        .set_variable("missing-var", &ParameterValue::Integer(1))
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("NetLogo error: Nothing named MISSING-VAR has been defined."));
}
