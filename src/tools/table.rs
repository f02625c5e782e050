//! Markdown rendering for stepped-run results.

use crate::engine::{Normalizer, Table};
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table as TextTable;
use serde_json::Value;

/// Header of the leading step-index column.
pub const STEP_COLUMN: &str = "tick";

/// Keep each cell on one line: pipes and line breaks are escaped.
fn escape_cell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(text) => escape_cell(text),
        other => escape_cell(&other.to_string()),
    }
}

/// Render `table` as a markdown table: a `tick` column holding the row index
/// followed by one column per table column.
pub fn markdown(table: &Table, normalizer: &Normalizer) -> String {
    let mut text = TextTable::new();
    text.load_preset(ASCII_MARKDOWN);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(STEP_COLUMN.to_string());
    header.extend(table.columns.iter().map(|column| escape_cell(column)));
    text.set_header(header);

    for (step, row) in table.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len() + 1);
        cells.push(step.to_string());
        cells.extend(row.iter().map(|value| render_cell(&normalizer.normalize(value))));
        text.add_row(cells);
    }
    text.to_string()
}
