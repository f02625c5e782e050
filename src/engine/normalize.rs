//! Value normalization
//!
//! Maps engine values onto JSON. The mapping is a registry keyed by
//! [`ValueShape`]: each shape has a converter, and new shapes (for example a
//! foreign class from a NetLogo extension) are supported by registering a
//! converter rather than by editing call sites. Values whose shape has no
//! converter pass through in their most direct JSON form.

use super::value::{EngineValue, Table, ValueShape};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts one value shape to JSON. The normalizer is passed in so
/// container converters can recurse through the registry.
pub trait ShapeConverter: Send + Sync {
    fn convert(&self, value: &EngineValue, normalizer: &Normalizer) -> Value;
}

impl<F> ShapeConverter for F
where
    F: Fn(&EngineValue, &Normalizer) -> Value + Send + Sync,
{
    fn convert(&self, value: &EngineValue, normalizer: &Normalizer) -> Value {
        self(value, normalizer)
    }
}

/// Registry of shape converters.
#[derive(Clone)]
pub struct Normalizer {
    converters: HashMap<ValueShape, Arc<dyn ShapeConverter>>,
}

impl Normalizer {
    /// A normalizer with no converters; everything passes through.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// The standard mapping for every shape the engine produces.
    pub fn standard() -> Self {
        let mut normalizer = Self::empty();
        normalizer.register(ValueShape::Nothing, |_: &EngineValue, _: &Normalizer| {
            Value::Null
        });
        normalizer.register(ValueShape::Boolean, |v: &EngineValue, _: &Normalizer| {
            passthrough(v)
        });
        normalizer.register(ValueShape::Integer, |v: &EngineValue, _: &Normalizer| {
            passthrough(v)
        });
        normalizer.register(ValueShape::Float, |v: &EngineValue, _: &Normalizer| {
            passthrough(v)
        });
        normalizer.register(ValueShape::Text, |v: &EngineValue, _: &Normalizer| {
            passthrough(v)
        });
        normalizer.register(ValueShape::List, convert_list);
        normalizer.register(ValueShape::Table, convert_table);
        normalizer
    }

    /// Register or replace the converter for a shape.
    pub fn register<C>(&mut self, shape: ValueShape, converter: C)
    where
        C: ShapeConverter + 'static,
    {
        self.converters.insert(shape, Arc::new(converter));
    }

    pub fn normalize(&self, value: &EngineValue) -> Value {
        match self.converters.get(&value.shape()) {
            Some(converter) => converter.convert(value, self),
            None => passthrough(value),
        }
    }

    /// Normalize a table into a column-major object.
    pub fn normalize_table(&self, table: &Table) -> Value {
        table_to_columns(table, self)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::standard()
    }
}

fn convert_list(value: &EngineValue, normalizer: &Normalizer) -> Value {
    match value {
        EngineValue::List(items) => {
            Value::Array(items.iter().map(|item| normalizer.normalize(item)).collect())
        }
        other => passthrough(other),
    }
}

fn convert_table(value: &EngineValue, normalizer: &Normalizer) -> Value {
    match value {
        EngineValue::Table(table) => table_to_columns(table, normalizer),
        other => passthrough(other),
    }
}

/// Column name to ordered column values. Column order follows the table.
fn table_to_columns(table: &Table, normalizer: &Normalizer) -> Value {
    let mut columns = Map::new();
    for (index, name) in table.columns.iter().enumerate() {
        let values = table
            .column(index)
            .map(|cell| normalizer.normalize(cell))
            .collect();
        columns.insert(name.clone(), Value::Array(values));
    }
    Value::Object(columns)
}

/// Direct JSON form of a value, used when no converter is registered.
fn passthrough(value: &EngineValue) -> Value {
    match value {
        EngineValue::Nothing => Value::Null,
        EngineValue::Boolean(b) => Value::Bool(*b),
        EngineValue::Integer(i) => Value::Number(Number::from(*i)),
        EngineValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        EngineValue::Text(s) => Value::String(s.clone()),
        EngineValue::List(items) => Value::Array(items.iter().map(passthrough).collect()),
        EngineValue::Table(table) => table_to_columns(table, &Normalizer::empty()),
        EngineValue::Foreign { repr, .. } => Value::String(repr.clone()),
    }
}
