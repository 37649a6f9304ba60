//! Decode-or-default combinators over untrusted JSON records.
//!
//! Every accessor returns either the typed value or `None`; the `_or`
//! variants substitute a default. Nothing here allocates unless a value is
//! actually taken, and nothing panics on any input.

use serde_json::{Map, Value};

/// A read-only view over the members of a JSON object.
///
/// A non-object value yields a view with no members, so every accessor falls
/// through to its default.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            map: value.as_object(),
        }
    }

    pub fn of(map: &'a Map<String, Value>) -> Self {
        Self { map: Some(map) }
    }

    /// Whether the underlying value was a JSON object.
    pub fn is_record(&self) -> bool {
        self.map.is_some()
    }

    /// Whether `key` is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.str(key).map(str::to_string)
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.str(key).unwrap_or(default).to_string()
    }

    pub fn string_or_else(&self, key: &str, default: impl FnOnce() -> String) -> String {
        self.string(key).unwrap_or_else(default)
    }

    /// Any JSON number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// A JSON number read as epoch milliseconds; fractions are truncated.
    pub fn millis(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(as_millis)
    }

    pub fn millis_or_else(&self, key: &str, default: impl FnOnce() -> i64) -> i64 {
        self.millis(key).unwrap_or_else(default)
    }

    /// A non-negative whole number usable as a position.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.get(key)
            .and_then(as_whole)
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn index_or(&self, key: &str, default: usize) -> usize {
        self.index(key).unwrap_or(default)
    }

    /// A non-negative number truncated into `u32`, e.g. pixel dimensions.
    pub fn u32_or(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(as_non_negative)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(default)
    }

    /// A non-negative number truncated into `u64`, e.g. durations.
    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(as_non_negative).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn array(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn object(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// A string member decoded through a closed-enumeration parser.
    pub fn enumerant<T>(&self, key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        self.str(key).and_then(parse)
    }
}

fn as_millis(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value.as_f64()?.trunc();
    // `as` saturates; reject anything it would clamp. `i64::MAX as f64` rounds
    // up to 2^63, so the upper bound is exclusive.
    (n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

fn as_whole(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    (n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64).then_some(n as u64)
}

fn as_non_negative(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    (n >= 0.0 && n < u64::MAX as f64).then_some(n.trunc() as u64)
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
