//! Named variables declared ahead of a statement with `LET`.

use crate::error::Result;
use crate::query::serializer::{encode, ensure_key, format_datetime};
use crate::query::value::Value;

/// Ordered variable bindings. Re-binding a name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds every entry of `other`, overriding names already present.
    pub fn extend(&mut self, other: Bindings) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// One `LET $name = <literal>;` line per binding.
    pub fn preamble(&self) -> Result<String> {
        let mut out = String::new();
        for (name, value) in &self.entries {
            ensure_key(name)?;
            out.push_str("LET $");
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(&encode(value)?);
            out.push_str(";\n");
        }
        Ok(out)
    }

    /// JSON view used for log payloads.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect(),
        )
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Value::from(*f),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(ts) => match format_datetime(ts) {
            Ok(text) => serde_json::Value::String(text),
            Err(_) => serde_json::Value::String(ts.to_string()),
        },
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
        Value::Record(reference) => serde_json::Value::String(reference.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_declares_each_binding() {
        let bindings = Bindings::new()
            .with("name", "apple")
            .with("count", 3i64);
        assert_eq!(
            bindings.preamble().unwrap(),
            "LET $name = \"apple\";\nLET $count = 3;\n"
        );
    }

    #[test]
    fn rebinding_replaces_in_place() {
        let bindings = Bindings::new().with("a", 1i64).with("b", 2i64).with("a", 3i64);
        let names: Vec<&str> = bindings.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(bindings.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn log_view_matches_sent_datetime() {
        let ts = time::macros::datetime!(2023-04-05 06:07:08 +02:00);
        let bindings = Bindings::new().with("at", ts);
        assert_eq!(
            bindings.to_json(),
            serde_json::json!({"at": "2023-04-05T04:07:08Z"})
        );
        assert_eq!(
            bindings.preamble().unwrap(),
            "LET $at = \"2023-04-05T04:07:08Z\";\n"
        );
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let bindings = Bindings::new().with("x = 1; DELETE fruit; LET $y", true);
        assert_eq!(bindings.preamble().unwrap_err().code(), "InvalidKey");
    }
}
