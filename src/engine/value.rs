//! Values returned by reporter evaluation.

/// A value produced by the engine, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    /// `nobody` or a Java null.
    Nothing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// A NetLogo list. Elements may themselves be lists.
    List(Vec<EngineValue>),
    Table(Table),
    /// Any engine object without a native mapping (agents, agentsets,
    /// extension objects). `type_name` is the runtime class name.
    Foreign { type_name: String, repr: String },
}

/// Shape key used to select a converter during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Nothing,
    Boolean,
    Integer,
    Float,
    Text,
    List,
    Table,
    Foreign(String),
}

impl EngineValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            EngineValue::Nothing => ValueShape::Nothing,
            EngineValue::Boolean(_) => ValueShape::Boolean,
            EngineValue::Integer(_) => ValueShape::Integer,
            EngineValue::Float(_) => ValueShape::Float,
            EngineValue::Text(_) => ValueShape::Text,
            EngineValue::List(_) => ValueShape::List,
            EngineValue::Table(_) => ValueShape::Table,
            EngineValue::Foreign { type_name, .. } => ValueShape::Foreign(type_name.clone()),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EngineValue::Integer(i) => Some(*i as f64),
            EngineValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integral view of the value. Floats qualify only when they carry no
    /// fractional part, which is how the engine reports coordinates.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EngineValue::Integer(i) => Some(*i),
            EngineValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}

impl From<bool> for EngineValue {
    fn from(value: bool) -> Self {
        EngineValue::Boolean(value)
    }
}

impl From<i64> for EngineValue {
    fn from(value: i64) -> Self {
        EngineValue::Integer(value)
    }
}

impl From<f64> for EngineValue {
    fn from(value: f64) -> Self {
        EngineValue::Float(value)
    }
}

impl From<&str> for EngineValue {
    fn from(value: &str) -> Self {
        EngineValue::Text(value.to_string())
    }
}

impl From<String> for EngineValue {
    fn from(value: String) -> Self {
        EngineValue::Text(value)
    }
}

/// Rows of values under named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<EngineValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Vec<EngineValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &EngineValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
