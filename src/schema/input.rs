//! Raw, untyped input as submitted by a form or a JSON client.

use serde_json::{Map, Value};

/// Untyped mapping from field name to submitted value.
///
/// Values are usually strings (form posts) but JSON callers may submit
/// booleans or numbers. `null` is treated as "not submitted".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    values: Map<String, Value>,
}

impl RawInput {
    /// Create an empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from form pairs. When a key repeats, the first value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Map::new();
        for (key, value) in pairs {
            values
                .entry(key.into())
                .or_insert_with(|| Value::String(value.into()));
        }
        Self { values }
    }

    /// Build from a JSON value; only objects are accepted
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self { values }),
            _ => None,
        }
    }

    /// Add or replace a field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Submitted value for a field, if any
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for RawInput {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
