//! Dotted key helpers: normalisation, flattening and unflattening

use crate::walker::join_key;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys are case-insensitive; this is the stored form
pub fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// Flatten a value tree into dotted leaf keys under `prefix`
///
/// Lists are leaves. An empty mapping below the root is kept as a leaf so
/// that an explicitly empty section survives a round trip.
pub fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() || prefix.is_empty() => {
            for (key, child) in map {
                flatten_into(&join_key(prefix, &normalize(key)), child, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Flatten a value tree into a fresh map
pub fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_into("", value, &mut out);
    out
}

/// Rebuild nested mappings from dotted keys
///
/// When a key is both a leaf and the parent of other keys (`a` and `a.b`),
/// the nested keys win.
pub fn unflatten<'a>(entries: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Value {
    let mut root = Map::new();
    for (key, value) in entries {
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &segments, value);
    }
    Value::Object(root)
}

fn insert_path(node: &mut Map<String, Value>, segments: &[&str], value: &Value) {
    match segments {
        [] => {}
        [last] => match node.get(*last) {
            Some(Value::Object(existing)) if !existing.is_empty() => {}
            _ => {
                node.insert((*last).to_string(), value.clone());
            }
        },
        [head, rest @ ..] => {
            let entry = node
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}
