use netlogo_mcp::error::ApiError;
use netlogo_mcp::tools::ToolCall;
use serde_json::{json, Value};

use crate::integration::support::Harness;

fn grid(harness: &Harness, attribute: &str) -> Vec<Vec<Value>> {
    let text = harness.tools.patch_grid(attribute).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn world_state_reports_counts_and_bounds_in_order() {
    let harness = Harness::new();
    harness.load_counter_model();
    harness.tools.command("setup").unwrap();
    harness.tools.command("go").unwrap();
    harness.tools.command("go").unwrap();

    let summary: Value = serde_json::from_str(&harness.tools.world_state().unwrap()).unwrap();
    let keys: Vec<&String> = summary.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "ticks",
            "turtle_count",
            "patch_count",
            "link_count",
            "min_pxcor",
            "max_pxcor",
            "min_pycor",
            "max_pycor",
        ]
    );
    assert_eq!(
        summary,
        json!({
            "ticks": 2.0,
            "turtle_count": 2,
            "patch_count": 35,
            "link_count": 0,
            "min_pxcor": -3.0,
            "max_pxcor": 3.0,
            "min_pycor": -2.0,
            "max_pycor": 2.0,
        })
    );
}

#[test]
fn world_state_fails_whole_when_ticks_never_started() {
    let harness = Harness::new();
    harness.add_model("raw.nlogo", "; NO-RESET\nto setup\n  clear-all\nend");
    harness.tools.open_model("raw").unwrap();

    let err = harness.tools.world_state().unwrap_err();
    assert!(matches!(err, ApiError::EngineError { .. }));
    assert!(err
        .to_string()
        .contains("The tick counter has not been started yet."));
}

#[test]
fn patch_grid_rows_run_top_to_bottom() {
    let harness = Harness::new();
    harness.load_counter_model();
    harness.set_extent(-1, 2, -1, 1);

    let xs = grid(&harness, "pxcor");
    assert_eq!(xs.len(), 3);
    for row in &xs {
        assert_eq!(row, &vec![json!(-1.0), json!(0.0), json!(1.0), json!(2.0)]);
    }

    let ys = grid(&harness, "pycor");
    let firsts: Vec<&Value> = ys.iter().map(|row| &row[0]).collect();
    assert_eq!(firsts, vec![&json!(1.0), &json!(0.0), &json!(-1.0)]);
    assert!(ys.iter().all(|row| row.iter().all(|cell| cell == &row[0])));

    let coords = grid(&harness, "coord");
    assert_eq!(coords[0][0], "-1,1");
    assert_eq!(coords[0][3], "2,1");
    assert_eq!(coords[2][0], "-1,-1");
    assert_eq!(coords[2][3], "2,-1");
}

#[test]
fn patch_grid_rejects_short_value_lists() {
    let harness = Harness::new();
    harness.load_counter_model();
    let err = harness.tools.patch_grid("short").unwrap_err();
    assert!(err
        .to_string()
        .contains("expected 35 patch values for a 7x5 world, got 34"));
}

#[test]
fn patch_grid_reports_unknown_attributes() {
    let harness = Harness::new();
    harness.load_counter_model();
    let err = harness.tools.patch_grid("elevation").unwrap_err();
    assert!(err
        .to_string()
        .starts_with("NetLogo error: Nothing named ELEVATION has been defined."));

    let err = harness
        .tools
        .call(ToolCall::GetPatchData {
            attribute: "  ".into(),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "attribute cannot be empty.");
}
