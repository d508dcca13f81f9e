//! Column specifications
//!
//! A column either reads a named field from the row or computes its value.
//! Named fields are resolved against the row's serialized form with a dotted
//! path ("groupVersionKind.kind"), so any `Serialize` row type works.

use serde::Serialize;
use serde_json::Value;

/// How a column's keys are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortType {
    Number,
    Date,
    Bool,
    String,
}

/// Raw key extracted from a row, interpreted according to the column's [`SortType`]
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl SortKey {
    /// The key as display text, used by string comparison
    pub fn as_text(&self) -> String {
        match self {
            SortKey::Number(n) => n.to_string(),
            SortKey::Text(s) => s.clone(),
            SortKey::Bool(b) => b.to_string(),
            SortKey::Null => String::new(),
        }
    }
}

impl From<&Value> for SortKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => n.as_f64().map(SortKey::Number).unwrap_or(SortKey::Null),
            Value::String(s) => SortKey::Text(s.clone()),
            other => SortKey::Text(other.to_string()),
        }
    }
}

impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        SortKey::Text(s.to_string())
    }
}

impl From<String> for SortKey {
    fn from(s: String) -> Self {
        SortKey::Text(s)
    }
}

impl From<f64> for SortKey {
    fn from(n: f64) -> Self {
        SortKey::Number(n)
    }
}

impl From<i64> for SortKey {
    fn from(n: i64) -> Self {
        SortKey::Number(n as f64)
    }
}

impl From<bool> for SortKey {
    fn from(b: bool) -> Self {
        SortKey::Bool(b)
    }
}

pub type Renderer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
pub type Sorter<T> = Box<dyn Fn(&T) -> SortKey + Send + Sync>;

/// What a column displays
pub enum ColumnValue<T> {
    /// Dotted path into the row's serialized form
    Field(String),
    /// Value derived from the whole row
    Computed(Renderer<T>),
}

/// A table column
pub struct Field<T> {
    pub label: String,
    pub value: ColumnValue<T>,
    /// Columns without a sort type cannot be selected for sorting
    pub sort_type: Option<SortType>,
    /// Overrides the key compared when sorting, independent of what is shown
    pub sort_value: Option<Sorter<T>>,
    /// Maximum display width in characters
    pub width: Option<usize>,
}

impl<T> Field<T> {
    pub fn named(label: &str, path: &str) -> Self {
        Self {
            label: label.to_string(),
            value: ColumnValue::Field(path.to_string()),
            sort_type: None,
            sort_value: None,
            width: None,
        }
    }

    pub fn computed<F>(label: &str, render: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            value: ColumnValue::Computed(Box::new(render)),
            sort_type: None,
            sort_value: None,
            width: None,
        }
    }

    pub fn sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_type = Some(sort_type);
        self
    }

    pub fn sort_value<F>(mut self, sorter: F) -> Self
    where
        F: Fn(&T) -> SortKey + Send + Sync + 'static,
    {
        self.sort_value = Some(Box::new(sorter));
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_type.is_some()
    }
}

impl<T: Serialize> Field<T> {
    /// Cell text for a row
    pub fn render(&self, row: &T) -> String {
        match &self.value {
            ColumnValue::Computed(render) => render(row),
            ColumnValue::Field(path) => match lookup(row, path) {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }

    /// Comparable key for a row
    ///
    /// `sort_value` wins when present. A computed column without one sorts by
    /// its rendered text.
    pub fn sort_key(&self, row: &T) -> SortKey {
        if let Some(sorter) = &self.sort_value {
            return sorter(row);
        }
        match &self.value {
            ColumnValue::Field(path) => lookup(row, path)
                .as_ref()
                .map(SortKey::from)
                .unwrap_or(SortKey::Null),
            ColumnValue::Computed(render) => SortKey::Text(render(row)),
        }
    }
}

/// Find the label's column index, ignoring case
pub fn column_index<T>(fields: &[Field<T>], label: &str) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.label.eq_ignore_ascii_case(label))
}

fn lookup<T: Serialize>(row: &T, path: &str) -> Option<Value> {
    let value = serde_json::to_value(row).ok()?;
    lookup_path(&value, path).cloned()
}

/// Resolve a dotted path; numeric segments index into arrays
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}
