//! Literal encoding for statement text and `LET` bindings.

use std::fmt::Write;

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{Result, SerializeError, ValidationError};
use crate::query::value::Value;

/// Encodes a value as a query-language literal.
pub fn encode(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Encodes an object as ` key = value` fragments joined by commas, the form
/// accepted after `SET`. Non-object values encode as a plain literal.
pub fn encode_assignments(value: &Value) -> Result<String> {
    let Value::Object(map) = value else {
        return encode(value);
    };
    let mut parts = Vec::with_capacity(map.len());
    for (key, item) in map {
        ensure_key(key)?;
        parts.push(format!(" {key} = {}", encode(item)?));
    }
    Ok(parts.join(","))
}

/// Escapes the two metacharacters of a double-quoted string literal.
pub fn escape_str(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}

/// Fails unless `id` has the shape `table:key` over `[A-Za-z0-9_]`.
pub fn ensure_record_key(id: &str) -> Result<&str> {
    let valid = id
        .split_once(':')
        .is_some_and(|(table, key)| is_key(table) && is_key(key));
    if valid {
        Ok(id)
    } else {
        Err(ValidationError::InvalidRecordKey(id.to_owned()).into())
    }
}

/// Fails unless `key` is non-empty and made of `[A-Za-z0-9_]`.
pub fn ensure_key(key: &str) -> Result<&str> {
    if is_key(key) {
        Ok(key)
    } else {
        Err(ValidationError::InvalidKey(key.to_owned()).into())
    }
}

/// Fails unless `path` is one or more keys joined by `.`, such as
/// `owner.name`. Field names in projections, filters, ordering, and fetch
/// clauses go through this check before reaching statement text.
pub fn ensure_field_path(path: &str) -> Result<&str> {
    if path.split('.').all(is_key) {
        Ok(path)
    } else {
        Err(ValidationError::InvalidKey(path.to_owned()).into())
    }
}

/// RFC 3339 text in UTC, the form datetimes take in statement literals.
pub fn format_datetime(ts: &OffsetDateTime) -> Result<String> {
    ts.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| SerializeError::Unserializable(err.to_string()).into())
}

fn is_key(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn write_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Record(reference) => out.push_str(reference.as_str()),
        Value::DateTime(ts) => {
            let formatted = format_datetime(ts)?;
            out.push('"');
            out.push_str(&formatted);
            out.push('"');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(&escape_str(key));
                out.push_str("\":");
                write_value(out, item)?;
            }
            out.push('}');
        }
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape_str(s));
            out.push('"');
        }
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(SerializeError::Unserializable(format!("non-finite number {f}")).into());
            }
            // Debug keeps a fraction or exponent, so the literal stays a float.
            let _ = write!(out, "{f:?}");
        }
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Null => out.push_str("null"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::value::RawReference;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    #[test]
    fn escapes_quotes_and_backslashes() {
        let encoded = encode(&Value::from("a\"b\\c")).unwrap();
        assert_eq!(encoded, r#""a\"b\\c""#);
    }

    #[test]
    fn injection_attempt_stays_inside_literal() {
        let encoded = encode(&Value::from(r#"PIPPO";LET $var = "HACKED"#)).unwrap();
        assert_eq!(encoded, r#""PIPPO\";LET $var = \"HACKED""#);
    }

    #[test]
    fn raw_reference_is_not_quoted() {
        let value = Value::Record(RawReference::record("animal:tiger").unwrap());
        assert_eq!(encode(&value).unwrap(), "animal:tiger");
    }

    #[test]
    fn nested_structures() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("pear"));
        map.insert("tags".to_string(), Value::from(vec![1i64, 2]));
        map.insert("ripe".to_string(), Value::Null);
        assert_eq!(
            encode(&Value::Object(map)).unwrap(),
            r#"{"name":"pear","ripe":null,"tags":[1,2]}"#
        );
    }

    #[test]
    fn datetime_is_quoted_utc() {
        let value = Value::DateTime(datetime!(2023-04-05 06:07:08.5 +02:00));
        assert_eq!(encode(&value).unwrap(), r#""2023-04-05T04:07:08.5Z""#);
    }

    #[test]
    fn numbers_and_booleans() {
        assert_eq!(encode(&Value::Int(-3)).unwrap(), "-3");
        assert_eq!(encode(&Value::Float(1.5)).unwrap(), "1.5");
        assert_eq!(encode(&Value::Float(2.0)).unwrap(), "2.0");
        assert_eq!(encode(&Value::Float(1e300)).unwrap(), "1e300");
        assert_eq!(encode(&Value::Bool(false)).unwrap(), "false");
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let err = encode(&Value::Float(f64::NAN)).unwrap_err();
        assert_eq!(err.code(), "Unserializable");
    }

    #[test]
    fn assignments_form() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("kiwi"));
        map.insert("isRed".to_string(), Value::from(false));
        assert_eq!(
            encode_assignments(&Value::Object(map)).unwrap(),
            r#" isRed = false, name = "kiwi""#
        );
    }

    #[test]
    fn assignments_reject_unsafe_keys() {
        let mut map = BTreeMap::new();
        map.insert("name = 1, admin".to_string(), Value::from(true));
        assert!(encode_assignments(&Value::Object(map)).is_err());
    }

    #[test]
    fn record_key_validation() {
        assert!(ensure_record_key("fruit:apple_1").is_ok());
        for bad in ["fruit", ":apple", "fruit:", "fruit:a:b", "fr uit:a", "fruit:a-b", ""] {
            assert!(ensure_record_key(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn field_path_validation() {
        assert!(ensure_field_path("owner.name").is_ok());
        assert!(ensure_field_path("isRed").is_ok());
        for bad in ["", "owner.", ".name", "name = 1 OR true", "a;b", "x AS y"] {
            assert!(ensure_field_path(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn key_validation() {
        assert!(ensure_key("optionSet").is_ok());
        assert!(ensure_key("").is_err());
        assert!(ensure_key("a b").is_err());
        assert!(ensure_key("a;b").is_err());
    }
}
