//! Ordered, string-keyed writable map for event payloads and handler config
//!
//! This is the container that crosses the host/embedding boundary: extractors
//! append gesture fields into it, the host reads it (or ships it as JSON).
//! The same type doubles as the config map handlers are configured from.
//!
//! Two properties matter and are kept deliberately strict:
//! - iteration order is insertion order
//! - the public API can add and replace values, never remove them

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single payload value. Mirrors what a host-side map can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Double(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl EventValue {
    /// Numeric view. `Int` widens to `f64`, matching how host-side maps
    /// treat numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EventValue::Double(v) => Some(*v),
            EventValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EventValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Human-readable type name, used in config error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            EventValue::Double(_) => "number",
            EventValue::Int(_) => "integer",
            EventValue::Bool(_) => "boolean",
            EventValue::Str(_) => "string",
        }
    }
}

impl From<f64> for EventValue {
    fn from(v: f64) -> Self {
        EventValue::Double(v)
    }
}

impl From<i64> for EventValue {
    fn from(v: i64) -> Self {
        EventValue::Int(v)
    }
}

impl From<i32> for EventValue {
    fn from(v: i32) -> Self {
        EventValue::Int(v as i64)
    }
}

impl From<bool> for EventValue {
    fn from(v: bool) -> Self {
        EventValue::Bool(v)
    }
}

impl From<&str> for EventValue {
    fn from(v: &str) -> Self {
        EventValue::Str(v.to_string())
    }
}

impl From<String> for EventValue {
    fn from(v: String) -> Self {
        EventValue::Str(v)
    }
}

/// Ordered key/value container written by event data extractors.
///
/// Payloads are small (under ten keys), so entries live in a `Vec` and
/// lookups are linear. Inserting an existing key replaces its value in
/// place; the key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDataMap {
    entries: Vec<(String, EventValue)>,
}

impl EventDataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a value, or replace in place if the key already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EventValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(EventValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(EventValue::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(EventValue::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EventValue::as_str)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for EventValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EventValue::Double(v) => serializer.serialize_f64(*v),
            EventValue::Int(v) => serializer.serialize_i64(*v),
            EventValue::Bool(v) => serializer.serialize_bool(*v),
            EventValue::Str(v) => serializer.serialize_str(v),
        }
    }
}

impl Serialize for EventDataMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
