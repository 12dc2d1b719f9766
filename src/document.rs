//! Declaration documents
//!
//! A document is a YAML mapping from address key to entry:
//!
//! ```yaml
//! org.mate.screensaver:
//!     value:
//!         lock-enabled: false
//! /org/mate/panel/objects/clock/prefs/:
//!     schema: org.mate.panel.applet.clock
//!     value:
//!         format: 12-hour
//! ```
//!
//! Entry order and key order within each `value` mapping are preserved.
//! String scalars may carry `${name}` placeholders, substituted after
//! parsing. A scalar that is exactly one placeholder takes the variable's
//! typed value; placeholders inside longer text are spliced as text.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value as Yaml};
use tweakset_variant::Value;

use crate::address::{resolve, ResolvedAddress};

/// Values available to `${name}` placeholders
pub type TemplateVars = BTreeMap<String, Value>;

/// Fields an entry object may carry
const ENTRY_FIELDS: &[&str] = &["schema", "id", "value"];

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document must be a mapping of address keys to entries")]
    NotAMapping,

    #[error("entry '{entry}': {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error("entry '{entry}', key '{key}': {reason}")]
    InvalidLiteral {
        entry: String,
        key: String,
        reason: String,
    },

    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    #[error("unterminated placeholder at offset {0}")]
    UnterminatedPlaceholder(usize),
}

/// One addressable settings unit from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    /// Schema id, or instance path when `schema_override` is set
    pub address_key: String,

    pub schema_override: Option<String>,

    /// Explicit launcher identifier tag (`id:` field)
    pub launcher_id: Option<String>,

    /// Declared values in document order
    pub values: Vec<(String, Value)>,
}

impl ConfigEntry {
    pub fn new(address_key: impl Into<String>) -> Self {
        Self {
            address_key: address_key.into(),
            schema_override: None,
            launcher_id: None,
            values: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_override = Some(schema.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.push((key.into(), value));
        self
    }

    pub fn address(&self) -> ResolvedAddress {
        resolve(&self.address_key, self.schema_override.as_deref())
    }
}

/// An ordered batch of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub entries: Vec<ConfigEntry>,
}

impl ConfigDocument {
    /// Load and parse a document from a file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse, then substitute `${name}` placeholders inside string scalars.
    pub fn render(template: &str, vars: &TemplateVars) -> Result<Self, DocumentError> {
        let root: Yaml = serde_yaml::from_str(template)?;
        Self::from_yaml(substitute(root, vars)?)
    }

    /// Parse a document from YAML text.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Self::from_yaml(serde_yaml::from_str(text)?)
    }

    fn from_yaml(root: Yaml) -> Result<Self, DocumentError> {
        let mapping = match root {
            Yaml::Null => return Ok(Self::default()),
            Yaml::Mapping(mapping) => mapping,
            _ => return Err(DocumentError::NotAMapping),
        };

        let entries = mapping
            .into_iter()
            .map(|(key, body)| {
                let address_key = match key {
                    Yaml::String(s) => s,
                    other => return Err(DocumentError::InvalidEntry {
                        entry: format!("{:?}", other),
                        reason: "address key must be a string".to_string(),
                    }),
                };
                parse_entry(address_key, body)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }
}

fn parse_entry(address_key: String, body: Yaml) -> Result<ConfigEntry, DocumentError> {
    let invalid = |reason: String| DocumentError::InvalidEntry {
        entry: address_key.clone(),
        reason,
    };

    let Yaml::Mapping(fields) = body else {
        return Err(invalid("entry must be a mapping".to_string()));
    };

    let mut schema_override = None;
    let mut launcher_id = None;
    let mut values = None;

    for (field, content) in fields {
        let field = match field {
            Yaml::String(s) if ENTRY_FIELDS.contains(&s.as_str()) => s,
            other => return Err(invalid(format!("unknown field {:?}", other))),
        };
        match (field.as_str(), content) {
            ("schema", Yaml::String(s)) => schema_override = Some(s),
            ("id", Yaml::String(s)) => launcher_id = Some(s),
            ("value", Yaml::Mapping(map)) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, literal) in map {
                    let key = match key {
                        Yaml::String(key) => key,
                        other => return Err(invalid(format!("setting key {:?} must be a string", other))),
                    };
                    let value = literal_to_value(literal).map_err(|reason| DocumentError::InvalidLiteral {
                        entry: address_key.clone(),
                        key: key.clone(),
                        reason,
                    })?;
                    pairs.push((key, value));
                }
                values = Some(pairs);
            }
            (field, _) => return Err(invalid(format!("field '{}' has the wrong shape", field))),
        }
    }

    let values = values.ok_or_else(|| invalid("missing 'value' mapping".to_string()))?;

    Ok(ConfigEntry {
        address_key,
        schema_override,
        launcher_id,
        values,
    })
}

fn literal_to_value(literal: Yaml) -> Result<Value, String> {
    match literal {
        Yaml::Bool(b) => Ok(Value::Bool(b)),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Int(i)),
            (None, Some(f)) => Ok(Value::Float(f)),
            _ => Err(format!("unsupported number {}", n)),
        },
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Yaml::String(s) => Ok(s),
                Yaml::Bool(b) => Ok(b.to_string()),
                Yaml::Number(n) => Ok(n.to_string()),
                _ => Err("list items must be scalars".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::StringList),
        Yaml::Null => Err("value is empty".to_string()),
        Yaml::Mapping(_) => Err("nested mappings are not supported".to_string()),
        Yaml::Tagged(_) => Err("tagged values are not supported".to_string()),
    }
}

fn substitute(node: Yaml, vars: &TemplateVars) -> Result<Yaml, DocumentError> {
    match node {
        Yaml::String(text) => substitute_scalar(&text, vars),
        Yaml::Sequence(items) => items
            .into_iter()
            .map(|item| substitute(item, vars))
            .collect::<Result<Vec<_>, _>>()
            .map(Yaml::Sequence),
        Yaml::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                out.insert(substitute(key, vars)?, substitute(value, vars)?);
            }
            Ok(Yaml::Mapping(out))
        }
        other => Ok(other),
    }
}

fn substitute_scalar(text: &str, vars: &TemplateVars) -> Result<Yaml, DocumentError> {
    match whole_placeholder(text) {
        Some(name) => vars
            .get(name)
            .map(value_to_yaml)
            .ok_or_else(|| DocumentError::UnknownVariable(name.to_string())),
        None => render_template(text, vars).map(Yaml::String),
    }
}

/// The variable name when `text` is a single placeholder and nothing else.
fn whole_placeholder(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner.trim())
}

fn value_to_yaml(value: &Value) -> Yaml {
    match value {
        Value::String(s) => Yaml::String(s.clone()),
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Int(i) => Yaml::Number((*i).into()),
        Value::Float(f) => Yaml::Number((*f).into()),
        Value::StringList(items) => {
            Yaml::Sequence(items.iter().cloned().map(Yaml::String).collect())
        }
    }
}

fn splice_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute `${name}` placeholders in `template` as plain text.
pub fn render_template(template: &str, vars: &TemplateVars) -> Result<String, DocumentError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(DocumentError::UnterminatedPlaceholder(offset + start))?;
        let name = after[..end].trim();
        let value = vars
            .get(name)
            .ok_or_else(|| DocumentError::UnknownVariable(name.to_string()))?;
        out.push_str(&splice_text(value));

        let consumed = start + 2 + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}
