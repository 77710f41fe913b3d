//! Literal value representation handed to the serializer.
//!
//! Values arriving from callers are untrusted and always go through
//! [`crate::query::serializer::encode`]. Text that is spliced verbatim into a
//! statement is carried by [`TrustedFragment`] instead so the boundary is
//! visible at every call site.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

use crate::error::{Result, SerializeError};
use crate::query::serializer::ensure_record_key;

/// Untrusted literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal. Must be finite to encode.
    Float(f64),
    /// UTF-8 string literal, always quoted and escaped.
    String(String),
    /// Point in time, emitted as a quoted RFC 3339 string.
    DateTime(OffsetDateTime),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Keyed structure.
    Object(BTreeMap<String, Value>),
    /// Record pointer emitted without quoting.
    Record(RawReference),
}

impl Value {
    /// Converts any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value).map_err(SerializeError::from)?;
        Ok(Self::from_json(json))
    }

    /// Converts a decoded JSON value. Unsigned integers above `i64::MAX`
    /// become floats.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Returns the entry stored under `key` when this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Empty keyed structure, the default edge payload.
    pub fn empty_object() -> Self {
        Value::Object(BTreeMap::new())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<RawReference> for Value {
    fn from(value: RawReference) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

/// Record pointer such as `animal:tiger`, emitted verbatim.
///
/// The only constructor validates the payload, so an instance is always a
/// well-formed `table:key` identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawReference(String);

impl RawReference {
    /// Wraps a record identifier after validating its shape.
    pub fn record(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        ensure_record_key(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table segment of the identifier.
    pub fn table(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(t, _)| t)
    }
}

impl fmt::Display for RawReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Developer-controlled statement text spliced without escaping.
///
/// Used for raw `WHERE` conditions, select expressions, and edge labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustedFragment(String);

impl TrustedFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrustedFragment {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrustedFragment {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TrustedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Fruit {
        name: &'static str,
        is_red: bool,
        weight: Option<f64>,
    }

    #[test]
    fn from_serialize_builds_object() {
        let value = Value::from_serialize(&Fruit {
            name: "apple",
            is_red: true,
            weight: None,
        })
        .unwrap();
        assert_eq!(value.get("name"), Some(&Value::String("apple".into())));
        assert_eq!(value.get("is_red"), Some(&Value::Bool(true)));
        assert_eq!(value.get("weight"), Some(&Value::Null));
    }

    #[test]
    fn raw_reference_requires_record_shape() {
        assert!(RawReference::record("fruit:apple").is_ok());
        assert!(RawReference::record("fruit").is_err());
        assert!(RawReference::record("fruit:apple; DELETE fruit").is_err());
        assert_eq!(RawReference::record("fruit:a1").unwrap().table(), "fruit");
    }

    #[test]
    fn large_unsigned_becomes_float() {
        let value = Value::from_json(serde_json::json!(u64::MAX));
        assert!(matches!(value, Value::Float(_)));
    }
}
