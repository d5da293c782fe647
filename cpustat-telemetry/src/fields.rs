//! Nested key/value output produced by metric rendering.

use serde::Serialize;
use serde_json::{Map, Value};

/// A nested JSON object addressed by dotted keys.
///
/// `put("user.norm.pct", 0.5)` produces `{"user": {"norm": {"pct": 0.5}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricFields(Map<String, Value>);

impl MetricFields {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value at a dotted path, creating intermediate objects.
    ///
    /// A non-object value found along the path is replaced by an object.
    pub fn put(&mut self, key: &str, value: impl Into<Value>) {
        let mut segments = key.split('.').peekable();
        let mut current = &mut self.0;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value.into());
                return;
            }

            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            match entry {
                Value::Object(map) => current = map,
                _ => return,
            }
        }
    }

    /// Look up a value by dotted path.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.0.get(first)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        Some(value)
    }

    /// Returns `true` if a value exists at the dotted path.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field has been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<MetricFields> for Value {
    fn from(fields: MetricFields) -> Self {
        Value::Object(fields.0)
    }
}
