//! Weakly typed decoding of merged settings into a schema type
//!
//! Decoding walks the same field tree as the flag walk, so a value stored
//! under `database.max-conns` lands in the Rust field that declared that
//! name. Each value is coerced to its field's kind before serde builds the
//! target, which keeps the target untouched when any field fails.

use crate::config::{ConfigSchema, Field, FieldKind};
use crate::error::{Error, Result};
use crate::storage::kind_of;
use crate::store::keys::normalize;
use crate::walker::{child_prefix, join_key};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decode flat dotted settings into `T`
///
/// Named fields without a value are zeroed. Fields the schema skips keep
/// their `T::default()` value.
pub fn decode<T: ConfigSchema>(settings: &BTreeMap<String, Value>) -> Result<T> {
    let mut base = serde_json::to_value(T::default())?;
    match &mut base {
        Value::Object(target) => apply_fields("", &T::fields(), settings, target)?,
        other => {
            return Err(Error::Config(format!(
                "config type must serialize to a map, found {}",
                kind_of(other)
            )));
        }
    }

    serde_json::from_value(base).map_err(|e| Error::Deserialize(e.to_string()))
}

fn apply_fields(
    prefix: &str,
    fields: &[Field],
    settings: &BTreeMap<String, Value>,
    target: &mut Map<String, Value>,
) -> Result<()> {
    for field in fields {
        let kind = match field.kind {
            FieldKind::Nested(children) => {
                let entry = target
                    .entry(field.key.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(child) = entry {
                    apply_fields(&child_prefix(prefix, field), &children(), settings, child)?;
                }
                continue;
            }
            _ if field.is_unnamed() => continue,
            FieldKind::Unsupported(type_name) => {
                return Err(Error::UnsupportedFieldKind {
                    field: join_key(prefix, field.name),
                    type_name: type_name.to_string(),
                });
            }
            kind => kind,
        };

        let key = join_key(prefix, field.name);
        let value = match settings.get(&normalize(&key)) {
            Some(value) => coerce(kind, value, &key)?,
            None => zero_value(kind),
        };
        target.insert(field.key.to_string(), value);
    }
    Ok(())
}

fn zero_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Bool => Value::Bool(false),
        FieldKind::Int => Value::from(0_i64),
        _ => Value::String(String::new()),
    }
}

/// Coerce one value to a scalar kind
pub fn coerce(kind: FieldKind, value: &Value, key: &str) -> Result<Value> {
    let coerced = match kind {
        FieldKind::String => to_string(value),
        FieldKind::Bool => to_bool(value),
        FieldKind::Int => to_int(value),
        _ => None,
    };
    coerced.ok_or_else(|| Error::Decode {
        key: key.to_string(),
        expected: kind.type_name().to_string(),
        found: format!("{} {value}", kind_of(value)),
    })
}

fn to_string(value: &Value) -> Option<Value> {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => return None,
    };
    Some(Value::String(text))
}

fn to_bool(value: &Value) -> Option<Value> {
    let flag = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i != 0,
            (_, Some(u), _) => u != 0,
            (_, _, Some(f)) => f != 0.0,
            _ => return None,
        },
        Value::String(s) if s.is_empty() => false,
        Value::String(s) => parse_bool(s)?,
        Value::Array(_) | Value::Object(_) => return None,
    };
    Some(Value::Bool(flag))
}

fn to_int(value: &Value) -> Option<Value> {
    match value {
        Value::Null => Some(Value::from(0_i64)),
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| Value::from(f.trunc() as i64)),
        Value::Number(_) => Some(value.clone()),
        Value::String(s) if s.is_empty() => Some(Value::from(0_i64)),
        Value::String(s) => parse_int(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Boolean spellings accepted from text
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a decimal, `0x`, `0o` or `0b` integer with an optional sign
pub fn parse_int(s: &str) -> Option<Value> {
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        _ => (10, body),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        let signed = -i128::from(magnitude);
        i64::try_from(signed).ok().map(Value::from)
    } else {
        Some(
            i64::try_from(magnitude)
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(magnitude)),
        )
    }
}
