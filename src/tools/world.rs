//! World summary and patch grid queries.

use super::NetLogoTools;
use crate::engine::{EngineValue, Normalizer, Workspace};
use crate::error::ApiError;
use serde_json::{Map, Value};
use tracing::debug;

/// Summary keys and the reporters that produce them, in output order.
pub const SUMMARY_REPORTERS: &[(&str, &str)] = &[
    ("ticks", "ticks"),
    ("turtle_count", "count turtles"),
    ("patch_count", "count patches"),
    ("link_count", "count links"),
    ("min_pxcor", "min-pxcor"),
    ("max_pxcor", "max-pxcor"),
    ("min_pycor", "min-pycor"),
    ("max_pycor", "max-pycor"),
];

pub const EXTENT_REPORTER: &str = "(list min-pxcor max-pxcor min-pycor max-pycor)";

/// Reporter listing `attribute` for every patch in `sort patches` order:
/// rows top to bottom, left to right within a row.
pub fn grid_reporter(attribute: &str) -> String {
    format!("map [p -> [{}] of p] sort patches", attribute)
}

/// Patch coordinate bounds of the world, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldExtent {
    pub min_pxcor: i64,
    pub max_pxcor: i64,
    pub min_pycor: i64,
    pub max_pycor: i64,
}

impl WorldExtent {
    /// Read the four bounds from the value of [`EXTENT_REPORTER`].
    pub fn from_value(value: &EngineValue) -> Result<Self, ApiError> {
        let bounds = match value {
            EngineValue::List(items) if items.len() == 4 => items
                .iter()
                .map(EngineValue::as_i64)
                .collect::<Option<Vec<i64>>>(),
            _ => None,
        };
        match bounds.as_deref() {
            Some(&[min_pxcor, max_pxcor, min_pycor, max_pycor])
                if min_pxcor <= max_pxcor && min_pycor <= max_pycor =>
            {
                Ok(Self {
                    min_pxcor,
                    max_pxcor,
                    min_pycor,
                    max_pycor,
                })
            }
            _ => Err(ApiError::EngineError {
                message: format!("unexpected world extents: {:?}", value),
            }),
        }
    }

    pub fn width(&self) -> usize {
        (self.max_pxcor - self.min_pxcor + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_pycor - self.min_pycor + 1) as usize
    }

    /// Patch count implied by the bounds.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reshape patch values in `sort patches` order into rows, so that
/// `grid[r][c]` is the patch at `pycor = max_pycor - r`,
/// `pxcor = min_pxcor + c`.
pub fn reshape_grid(extent: &WorldExtent, values: Vec<Value>) -> Result<Vec<Vec<Value>>, ApiError> {
    if values.len() != extent.len() {
        return Err(ApiError::EngineError {
            message: format!(
                "expected {} patch values for a {}x{} world, got {}",
                extent.len(),
                extent.width(),
                extent.height(),
                values.len()
            ),
        });
    }
    let width = extent.width();
    let mut rows = Vec::with_capacity(extent.height());
    let mut values = values.into_iter();
    for _ in 0..extent.height() {
        rows.push(values.by_ref().take(width).collect());
    }
    Ok(rows)
}

/// Evaluate every summary reporter. Any failure aborts the whole summary.
pub fn summarize(
    workspace: &mut dyn Workspace,
    normalizer: &Normalizer,
) -> Result<Map<String, Value>, ApiError> {
    let mut summary = Map::new();
    for (key, reporter) in SUMMARY_REPORTERS {
        let value = workspace.report(reporter)?;
        summary.insert((*key).to_string(), normalizer.normalize(&value));
    }
    Ok(summary)
}

/// Evaluate the extents and the per-patch values of `attribute`.
pub fn sample_grid(
    workspace: &mut dyn Workspace,
    normalizer: &Normalizer,
    attribute: &str,
) -> Result<Vec<Vec<Value>>, ApiError> {
    let extent = WorldExtent::from_value(&workspace.report(EXTENT_REPORTER)?)?;
    let values = match workspace.report(&grid_reporter(attribute))? {
        EngineValue::List(items) => items.iter().map(|item| normalizer.normalize(item)).collect(),
        other => {
            return Err(ApiError::EngineError {
                message: format!("expected a list of patch values, got {:?}", other),
            })
        }
    };
    reshape_grid(&extent, values)
}

impl NetLogoTools {
    /// Tick count, agent counts and world bounds as a JSON object.
    pub fn world_state(&self) -> Result<String, ApiError> {
        let summary = self
            .session()
            .with_model(|workspace| summarize(workspace, self.normalizer()))?;
        Ok(serde_json::to_string_pretty(&Value::Object(summary))?)
    }

    /// One patch variable over the whole world as a 2D JSON array.
    pub fn patch_grid(&self, attribute: &str) -> Result<String, ApiError> {
        let attribute = attribute.trim();
        if attribute.is_empty() {
            return Err(ApiError::InvalidInput(
                "attribute cannot be empty.".to_string(),
            ));
        }
        debug!(attribute, "sampling patch grid");
        let grid = self
            .session()
            .with_model(|workspace| sample_grid(workspace, self.normalizer(), attribute))?;
        Ok(serde_json::to_string(&grid)?)
    }
}
