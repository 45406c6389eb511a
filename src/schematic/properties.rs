//! Block property coercion.
//!
//! Palette properties are stored as strings in the schematic. Downstream
//! consumers want typed values, so every raw value is coerced in a fixed
//! order: integer first, then boolean, otherwise the string is kept.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A coerced block property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    String(String),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::String(v) => write!(f, "{}", v),
        }
    }
}

/// Typed block properties, ordered by key.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Coerce a single raw property value.
pub fn coerce_value(raw: &str) -> PropertyValue {
    if let Ok(n) = raw.parse::<i64>() {
        return PropertyValue::Int(n);
    }
    match raw {
        "true" => PropertyValue::Bool(true),
        "false" => PropertyValue::Bool(false),
        _ => PropertyValue::String(raw.to_string()),
    }
}

/// Coerce a raw string property map. Never fails; keys are never added or dropped.
pub fn coerce_properties(raw: &HashMap<String, String>) -> Properties {
    raw.iter()
        .map(|(key, value)| (key.clone(), coerce_value(value)))
        .collect()
}
