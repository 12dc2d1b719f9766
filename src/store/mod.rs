//! Settings store backends
//!
//! Abstracts the external key-value store for testability. Provides:
//! - SettingsStore trait: schema metadata, key writes, reads and sync
//! - GsettingsStore: drives the `gsettings` tool for production
//! - MemoryStore: in-process store with failure injection for tests

mod gsettings;
pub mod memory;

pub use gsettings::GsettingsStore;
pub use memory::{MemoryStore, StoreOp};

use std::collections::BTreeMap;

use tweakset_variant::{Value, ValueType, VariantError};

use crate::address::ResolvedAddress;

/// Interface to the settings store.
///
/// Writes are not required to be durable until [`SettingsStore::sync`]
/// returns. Every operation may block on the store.
pub trait SettingsStore {
    /// Look up the metadata for a schema.
    fn schema(&mut self, schema: &str) -> Result<SchemaInfo, StoreError>;

    /// Write one key at an address.
    fn write(&mut self, address: &ResolvedAddress, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Read the current value of one key at an address.
    fn read(&mut self, address: &ResolvedAddress, key: &str) -> Result<Value, StoreError>;

    /// Make every write so far durable.
    fn sync(&mut self) -> Result<(), StoreError>;
}

/// Metadata the store reports for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInfo {
    pub value_type: ValueType,

    /// Allowed values for enum and flags keys; empty when unrestricted
    pub choices: Vec<String>,

    /// Inclusive bounds for ranged integer keys
    pub range: Option<(i64, i64)>,
}

impl KeyInfo {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            choices: Vec::new(),
            range: None,
        }
    }

    /// A string key restricted to the given choices.
    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value_type: ValueType::String,
            choices: choices.into_iter().map(Into::into).collect(),
            range: None,
        }
    }

    /// An integer key restricted to `min..=max`.
    pub fn ranged(min: i64, max: i64) -> Self {
        Self {
            value_type: ValueType::Int,
            choices: Vec::new(),
            range: Some((min, max)),
        }
    }
}

/// Metadata the store reports for one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
    pub id: String,

    /// Whether the schema has no fixed path and must be given one
    pub relocatable: bool,

    pub keys: BTreeMap<String, KeyInfo>,

    /// Keys whose type cannot be represented, with the reason
    pub unsupported: BTreeMap<String, String>,
}

impl SchemaInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            relocatable: false,
            keys: BTreeMap::new(),
            unsupported: BTreeMap::new(),
        }
    }

    pub fn relocatable(mut self) -> Self {
        self.relocatable = true;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>, info: KeyInfo) -> Self {
        self.keys.insert(key.into(), info);
        self
    }

    pub fn with_unsupported(mut self, key: impl Into<String>, reason: impl Into<String>) -> Self {
        self.unsupported.insert(key.into(), reason.into());
        self
    }

    pub fn key(&self, key: &str) -> Option<&KeyInfo> {
        self.keys.get(key)
    }

    /// Why `key` cannot be used, if the schema declares it with a type
    /// values cannot represent.
    pub fn unsupported(&self, key: &str) -> Option<&str> {
        self.unsupported.get(key).map(String::as_str)
    }

    /// Metadata for a key that can be written and read.
    pub fn require_key(&self, key: &str) -> Result<&KeyInfo, StoreError> {
        if let Some(reason) = self.unsupported(key) {
            return Err(StoreError::UnsupportedKey {
                schema: self.id.clone(),
                key: key.to_string(),
                reason: reason.to_string(),
            });
        }
        self.key(key).ok_or_else(|| StoreError::KeyNotInSchema {
            schema: self.id.clone(),
            key: key.to_string(),
        })
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no such schema '{0}'")]
    SchemaNotFound(String),

    #[error("no such key '{key}' in schema '{schema}'")]
    KeyNotInSchema { schema: String, key: String },

    #[error("key '{key}' in schema '{schema}' cannot be used: {reason}")]
    UnsupportedKey {
        schema: String,
        key: String,
        reason: String,
    },

    #[error("store rejected '{key}': {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("sync failed: {0}")]
    Sync(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unreadable store output: {0}")]
    Protocol(String),

    #[error("value error: {0}")]
    Variant(#[from] VariantError),
}
