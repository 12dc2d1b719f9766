//! Value coercion
//!
//! Converts author-facing literals into the exact representation a key's
//! schema declares. A document says `lock-enabled: false` or
//! `position: 202`; the store needs a boolean or an integer of the right
//! kind, and enum keys need one of their declared choices.

use tweakset_variant::{Value, ValueType};

use crate::store::{KeyInfo, SchemaInfo};

/// Boolean-like tokens accepted for boolean keys, compared case-insensitively.
const TRUE_TOKENS: &[&str] = &["true", "yes", "on"];
const FALSE_TOKENS: &[&str] = &["false", "no", "off"];

/// Coercion errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("cannot use {literal} as {expected}")]
    Mismatch { expected: ValueType, literal: String },

    #[error("'{value}' is not one of: {}", .choices.join(", "))]
    NotAChoice { value: String, choices: Vec<String> },

    #[error("{value} is outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("key type is not supported: {0}")]
    Unsupported(String),
}

/// Errors from coercing every value of one entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryCoercionError {
    #[error("no such key '{key}' in schema '{schema}'")]
    UnknownKey { schema: String, key: String },

    #[error("key '{key}': {source}")]
    Invalid {
        key: String,
        #[source]
        source: CoercionError,
    },
}

/// Coerce a literal to the declared type.
pub fn coerce(raw: &Value, declared: ValueType) -> Result<Value, CoercionError> {
    let coerced = match (declared, raw) {
        (ValueType::String, Value::String(s)) => Some(Value::String(s.clone())),
        (ValueType::String, Value::Int(i)) => Some(Value::String(i.to_string())),
        (ValueType::String, Value::Float(f)) => Some(Value::String(f.to_string())),
        (ValueType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (ValueType::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
        (ValueType::Bool, Value::String(s)) => parse_bool(s).map(Value::Bool),

        (ValueType::Int, Value::Int(i)) => Some(Value::Int(*i)),
        (ValueType::Int, Value::String(s)) => s.trim().parse().ok().map(Value::Int),

        (ValueType::Float, Value::Float(f)) => Some(Value::Float(*f)),
        (ValueType::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
        (ValueType::Float, Value::String(s)) => s.trim().parse().ok().map(Value::Float),

        (ValueType::StringList, Value::StringList(items)) => Some(Value::StringList(items.clone())),

        _ => None,
    };

    coerced.ok_or_else(|| CoercionError::Mismatch {
        expected: declared,
        literal: describe(raw),
    })
}

/// Coerce a literal against a key's full metadata, enforcing choices and range.
pub fn coerce_for_key(raw: &Value, info: &KeyInfo) -> Result<Value, CoercionError> {
    let value = coerce(raw, info.value_type)?;

    if !info.choices.is_empty() {
        let picked: &[String] = match &value {
            Value::String(s) => std::slice::from_ref(s),
            Value::StringList(items) => items,
            _ => &[],
        };
        if let Some(bad) = picked.iter().find(|v| !info.choices.contains(*v)) {
            return Err(CoercionError::NotAChoice {
                value: bad.clone(),
                choices: info.choices.clone(),
            });
        }
    }

    if let (Some((min, max)), Value::Int(i)) = (info.range, &value) {
        if *i < min || *i > max {
            return Err(CoercionError::OutOfRange { value: *i, min, max });
        }
    }

    Ok(value)
}

/// Coerce every value of an entry before anything is written.
///
/// Stops at the first key the schema does not declare or the first value
/// that does not fit its key.
pub fn coerce_entry(
    schema: &SchemaInfo,
    values: &[(String, Value)],
) -> Result<Vec<(String, Value)>, EntryCoercionError> {
    values
        .iter()
        .map(|(key, raw)| {
            if let Some(reason) = schema.unsupported(key) {
                return Err(EntryCoercionError::Invalid {
                    key: key.clone(),
                    source: CoercionError::Unsupported(reason.to_string()),
                });
            }
            let info = schema.key(key).ok_or_else(|| EntryCoercionError::UnknownKey {
                schema: schema.id.clone(),
                key: key.clone(),
            })?;
            let value = coerce_for_key(raw, info).map_err(|source| EntryCoercionError::Invalid {
                key: key.clone(),
                source,
            })?;
            Ok((key.clone(), value))
        })
        .collect()
}

fn parse_bool(token: &str) -> Option<bool> {
    let token = token.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::StringList(_) => format!("list {}", raw),
        other => format!("{} {}", other.value_type(), other),
    }
}
