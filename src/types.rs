use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;

/// A single cell value.
///
/// Raw sources only ever produce `Missing`, `Text` and `List`; the typed
/// variants appear once a column has been parsed or coerced.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Missing,
    Text(String),
    List(Vec<String>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Nested mapping, used for the alternate-title bundle
    Map(Record),
}

static MISSING: Value = Value::Missing;

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric zero, the "no data" marker for money and duration columns.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Converts a raw JSON value from the encyclopedia dump.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Null => None,
                        serde_json::Value::String(s) => Some(s),
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Missing => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::from(items.clone()),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Value::from(*v),
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::Map(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// One entity's field-to-value mapping, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.fields[i].1)
    }

    /// Like `get`, but an absent key reads as `Value::Missing`.
    pub fn value(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&MISSING)
    }

    /// Overwrites in place when the key exists, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.fields[i].1, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|i| self.fields.remove(i).1)
    }

    /// Moves the value under `old` to `new`; a no-op when `old` is absent.
    pub fn rename_key(&mut self, old: &str, new: &str) -> bool {
        match self.remove(old) {
            Some(value) => {
                self.insert(new, value);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// An ordered table of records sharing one column set.
///
/// Rows may be sparse; a key a row lacks reads as `Value::Missing`.
/// Transformations consume the dataset and hand back a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset whose columns are the union of all row keys, in first-seen order.
    pub fn from_records(name: impl Into<String>, rows: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if seen.insert(key.to_string()) {
                    columns.push(key.to_string());
                }
            }
        }
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(EtlError::missing_column(column, &self.name))
        }
    }

    pub fn cell(&self, row: usize, column: &str) -> &Value {
        self.rows.get(row).map(|r| r.value(column)).unwrap_or(&MISSING)
    }

    /// Number of rows where `column` is absent.
    pub fn null_count(&self, column: &str) -> usize {
        self.rows.iter().filter(|r| r.value(column).is_missing()).count()
    }

    /// Replaces (or appends) `column` with one value per row.
    pub fn with_column(mut self, column: &str, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(column, value);
        }
        self
    }

    /// Rewrites `column` cell by cell; the column must already exist.
    pub fn map_column<F>(mut self, column: &str, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, &Value) -> Result<Value>,
    {
        self.require_column(column)?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            let updated = f(i, row.value(column))?;
            row.insert(column, updated);
        }
        Ok(self)
    }

    pub fn drop_column(mut self, column: &str) -> Self {
        self.columns.retain(|c| c != column);
        for row in &mut self.rows {
            row.remove(column);
        }
        self
    }

    pub fn retain_columns<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&Dataset, &str) -> bool,
    {
        let dropped: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !keep(&self, c.as_str()))
            .cloned()
            .collect();
        for column in dropped {
            self = self.drop_column(&column);
        }
        self
    }

    pub fn filter_rows<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(|r| keep(r));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_record_insert_overwrites_in_place() {
        let mut r = record(&[("a", "1"), ("b", "2")]);
        r.insert("a", "3");
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.value("a"), &Value::from("3"));
    }

    #[test]
    fn test_record_rename_appends_new_key() {
        let mut r = record(&[("a", "1"), ("b", "2")]);
        assert!(r.rename_key("a", "c"));
        assert!(!r.rename_key("zzz", "y"));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_dataset_columns_are_union_in_first_seen_order() {
        let ds = Dataset::from_records(
            "t",
            vec![record(&[("a", "1")]), record(&[("b", "2"), ("a", "3")])],
        );
        assert_eq!(ds.columns(), &["a".to_string(), "b".to_string()]);
        assert!(ds.cell(0, "b").is_missing());
        assert_eq!(ds.null_count("b"), 1);
    }

    #[test]
    fn test_require_column_names_dataset() {
        let ds = Dataset::from_records("catalog", vec![record(&[("a", "1")])]);
        let err = ds.require_column("budget").unwrap_err();
        assert_eq!(err.to_string(), "No column named 'budget' in dataset 'catalog'");
    }

    #[test]
    fn test_json_conversion_keeps_lists_and_nulls() {
        let v = Value::from_json(serde_json::json!(["a", null, 3]));
        assert_eq!(v, Value::List(vec!["a".to_string(), "3".to_string()]));
        assert!(Value::from_json(serde_json::Value::Null).is_missing());
    }
}
