//! Tag-tree input: NBT parsing and typed access helpers.
//!
//! Structure files are usually gzip-compressed NBT, but raw NBT is accepted
//! as well. Parsing itself is delegated to `fastnbt`.

use crate::error::{ConverterError, Result};
use fastnbt::Value;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parse a (possibly gzip-compressed) NBT buffer into a generic tag tree.
pub fn read_tag_tree(data: &[u8]) -> Result<Value> {
    if data.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        GzDecoder::new(data).read_to_end(&mut inflated)?;
        Ok(fastnbt::from_bytes(&inflated)?)
    } else {
        Ok(fastnbt::from_bytes(data)?)
    }
}

/// The children of a compound node.
pub fn as_compound<'a>(value: &'a Value, what: &str) -> Result<&'a HashMap<String, Value>> {
    match value {
        Value::Compound(map) => Ok(map),
        other => Err(ConverterError::malformed(format!(
            "{} is a {}, expected a compound",
            what,
            tag_name(other)
        ))),
    }
}

/// The elements of a list node.
pub fn as_list<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(ConverterError::malformed(format!(
            "{} is a {}, expected a list",
            what,
            tag_name(other)
        ))),
    }
}

/// A required named child of a compound.
pub fn child<'a>(compound: &'a HashMap<String, Value>, name: &str, what: &str) -> Result<&'a Value> {
    compound
        .get(name)
        .ok_or_else(|| ConverterError::malformed(format!("{} has no '{}' tag", what, name)))
}

/// An integral scalar. Floating-point tags are rejected rather than truncated.
pub fn as_int(value: &Value) -> Option<i64> {
    match *value {
        Value::Byte(v) => Some(v as i64),
        Value::Short(v) => Some(v as i64),
        Value::Int(v) => Some(v as i64),
        Value::Long(v) => Some(v),
        _ => None,
    }
}

/// The string form of a scalar node, `None` for lists, compounds and arrays.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Byte(v) => Some(v.to_string()),
        Value::Short(v) => Some(v.to_string()),
        Value::Int(v) => Some(v.to_string()),
        Value::Long(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        _ => None,
    }
}

/// Human-readable tag type, for error messages.
pub fn tag_name(value: &Value) -> &'static str {
    match value {
        Value::Byte(_) => "byte",
        Value::Short(_) => "short",
        Value::Int(_) => "int",
        Value::Long(_) => "long",
        Value::Float(_) => "float",
        Value::Double(_) => "double",
        Value::String(_) => "string",
        Value::ByteArray(_) => "byte array",
        Value::IntArray(_) => "int array",
        Value::LongArray(_) => "long array",
        Value::List(_) => "list",
        Value::Compound(_) => "compound",
    }
}
