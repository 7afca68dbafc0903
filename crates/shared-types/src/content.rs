//! # Content Documents
//!
//! The payload a party publishes (and a responder claims it received) is an
//! open mapping from field name to any JSON value. `Content` keeps the keys in
//! a `BTreeMap`, so key order never affects equality or encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when turning raw input into a [`Content`] document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The JSON value was valid but not an object.
    #[error("content must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The input text was not valid JSON.
    #[error("content is not valid JSON: {0}")]
    Malformed(String),
}

/// Order-independent key/value document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(BTreeMap<String, Value>);

impl Content {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object from text, the way gateway arguments arrive.
    pub fn from_json_str(text: &str) -> Result<Self, ContentError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ContentError::Malformed(e.to_string()))?;
        Self::try_from(value)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Canonical JSON encoding: object keys sorted at every depth, integral
    /// numbers without a fractional part, no insignificant whitespace.
    #[must_use]
    pub fn to_canonical_json(&self) -> String {
        let sorted: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), canonicalize(v)))
            .collect();
        Value::Object(sorted).to_string()
    }
}

impl TryFrom<Value> for Content {
    type Error = ContentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ContentError::NotAnObject(kind_name(&other))),
        }
    }
}

impl From<Content> for Value {
    fn from(content: Content) -> Self {
        Value::Object(content.0.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Content {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Render a value the way a field-by-field comparison sees it.
///
/// Strings render raw (no quotes), so `"1"` and `1` render identically.
/// Integral numbers render without a fractional part regardless of whether
/// they were written as `1` or `1.0`. Nested arrays and objects render as
/// canonical JSON.
#[must_use]
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Number(n) => normalize_number(n).to_string(),
        nested => canonicalize(nested).to_string(),
    }
}

/// `1.0` becomes `1`; every other number is returned as is.
fn normalize_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            // 2^53: beyond this f64 no longer holds every integer.
            if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                return Number::from(f as i64);
            }
        }
    }
    n.clone()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(n) => Value::Number(normalize_number(n)),
        other => other.clone(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a = Content::from_json_str(r#"{"b": 2, "a": 1}"#).unwrap();
        let b = Content::from_json_str(r#"{"a": 1, "b": 2}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_canonical_json(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_nested_objects_are_canonical() {
        let c = Content::new().with("outer", json!({"z": 1, "a": [ {"y": 2, "b": 3} ]}));
        assert_eq!(
            c.to_canonical_json(),
            r#"{"outer":{"a":[{"b":3,"y":2}],"z":1}}"#
        );
    }

    #[test]
    fn test_integral_floats_are_canonical() {
        let c = Content::new()
            .with("stNum", json!(1.0))
            .with("nested", json!({"v": [2.0, 2.5]}));
        assert_eq!(
            c.to_canonical_json(),
            r#"{"nested":{"v":[2,2.5]},"stNum":1}"#
        );
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(
            Content::from_json_str("[1,2]"),
            Err(ContentError::NotAnObject("array"))
        );
        assert!(matches!(
            Content::from_json_str("{not json"),
            Err(ContentError::Malformed(_))
        ));
    }

    #[test]
    fn test_render_scalar_number_and_string_agree() {
        assert_eq!(render_scalar(&json!(1)), "1");
        assert_eq!(render_scalar(&json!(1.0)), "1");
        assert_eq!(render_scalar(&json!("1")), "1");
        assert_eq!(render_scalar(&json!(2.5)), "2.5");
        assert_eq!(render_scalar(&json!(true)), "true");
        assert_eq!(render_scalar(&json!({"b": 1, "a": 2})), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn test_serde_is_transparent() {
        let c = Content::new().with("stNum", 0).with("allData", "TRUE");
        let encoded = serde_json::to_string(&c).unwrap();
        assert_eq!(encoded, r#"{"allData":"TRUE","stNum":0}"#);
        let decoded: Content = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, c);
    }
}
