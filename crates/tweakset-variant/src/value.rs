//! Setting values and their declared types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VariantError;

/// A single setting's content.
///
/// Declared values from a document and values read back from the store
/// share this representation; coercion against a schema turns the
/// former into the exact variant the store expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    StringList(Vec<String>),
}

impl Value {
    /// The type this value already satisfies.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::StringList(_) => ValueType::StringList,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::text::format(self))
    }
}

/// The value type a schema declares for a key.
///
/// All GVariant integer widths collapse to [`ValueType::Int`]; width limits
/// are reported separately by the store as a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Bool,
    Int,
    Float,
    StringList,
}

impl ValueType {
    /// Parse a GVariant type signature such as `s`, `b`, `i` or `as`.
    pub fn from_signature(signature: &str) -> Result<Self, VariantError> {
        match signature.trim() {
            "s" => Ok(ValueType::String),
            "b" => Ok(ValueType::Bool),
            "y" | "n" | "q" | "i" | "u" | "x" | "t" | "h" => Ok(ValueType::Int),
            "d" => Ok(ValueType::Float),
            "as" => Ok(ValueType::StringList),
            other => Err(VariantError::UnsupportedSignature(other.to_string())),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Bool => "boolean",
            ValueType::Int => "integer",
            ValueType::Float => "double",
            ValueType::StringList => "string list",
        };
        f.write_str(name)
    }
}
