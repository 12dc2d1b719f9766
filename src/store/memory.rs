//! In-memory settings store
//!
//! Records every write and sync and keeps separate live and durable views,
//! making it easy to observe what an applier committed. Supports failure
//! injection for testing error paths.

use std::collections::HashMap;

use tweakset_variant::{Value, ValueType};

use super::{SchemaInfo, SettingsStore, StoreError};
use crate::address::ResolvedAddress;

/// One operation performed against the store, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Write {
        address: ResolvedAddress,
        key: String,
        value: Value,
    },
    Sync,
}

/// Failures to inject into store operations.
#[derive(Debug, Clone, Default)]
struct FailurePlan {
    /// Keys whose writes are rejected, with the rejection reason
    write_keys: HashMap<String, String>,

    /// Reason to fail every sync with
    sync: Option<String>,
}

type Slot = (String, String);

/// A test store holding schemas and values in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: HashMap<String, SchemaInfo>,
    live: HashMap<Slot, Value>,
    durable: HashMap<Slot, Value>,
    journal: Vec<StoreOp>,
    failures: FailurePlan,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema the store recognises.
    pub fn with_schema(mut self, schema: SchemaInfo) -> Self {
        self.schemas.insert(schema.id.clone(), schema);
        self
    }

    /// Seed a value as if it had been written and synced earlier.
    pub fn with_value(mut self, address: &ResolvedAddress, key: &str, value: Value) -> Self {
        let slot = slot(address, key);
        self.live.insert(slot.clone(), value.clone());
        self.durable.insert(slot, value);
        self
    }

    /// Reject every write to `key`.
    pub fn fail_write(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        self.failures.write_keys.insert(key.into(), reason.into());
    }

    /// Fail every sync.
    pub fn fail_sync(&mut self, reason: impl Into<String>) {
        self.failures.sync = Some(reason.into());
    }

    /// Clear injected failures.
    pub fn clear_failures(&mut self) {
        self.failures = FailurePlan::default();
    }

    /// The value most recently written, synced or not.
    pub fn value(&self, address: &ResolvedAddress, key: &str) -> Option<&Value> {
        self.live.get(&slot(address, key))
    }

    /// The value as of the last successful sync.
    pub fn durable_value(&self, address: &ResolvedAddress, key: &str) -> Option<&Value> {
        self.durable.get(&slot(address, key))
    }

    pub fn journal(&self) -> &[StoreOp] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn write_count(&self) -> usize {
        self.journal
            .iter()
            .filter(|op| matches!(op, StoreOp::Write { .. }))
            .count()
    }

    pub fn sync_count(&self) -> usize {
        self.journal.iter().filter(|op| **op == StoreOp::Sync).count()
    }

    fn lookup(&self, schema: &str) -> Result<&SchemaInfo, StoreError> {
        self.schemas
            .get(schema)
            .ok_or_else(|| StoreError::SchemaNotFound(schema.to_string()))
    }
}

impl SettingsStore for MemoryStore {
    fn schema(&mut self, schema: &str) -> Result<SchemaInfo, StoreError> {
        self.lookup(schema).cloned()
    }

    fn write(&mut self, address: &ResolvedAddress, key: &str, value: &Value) -> Result<(), StoreError> {
        let info = self.lookup(&address.schema)?.require_key(key)?;

        if info.value_type != value.value_type() {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: format!("expected {}, got {}", info.value_type, value.value_type()),
            });
        }

        if let Some(reason) = self.failures.write_keys.get(key) {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }

        self.live.insert(slot(address, key), value.clone());
        self.journal.push(StoreOp::Write {
            address: address.clone(),
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn read(&mut self, address: &ResolvedAddress, key: &str) -> Result<Value, StoreError> {
        let info = self.lookup(&address.schema)?.require_key(key)?;

        Ok(self
            .live
            .get(&slot(address, key))
            .cloned()
            .unwrap_or_else(|| default_value(info.value_type)))
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.journal.push(StoreOp::Sync);
        if let Some(reason) = &self.failures.sync {
            return Err(StoreError::Sync(reason.clone()));
        }
        self.durable = self.live.clone();
        Ok(())
    }
}

fn slot(address: &ResolvedAddress, key: &str) -> Slot {
    (address.to_string(), key.to_string())
}

/// Value reported for a key that was never written.
fn default_value(value_type: ValueType) -> Value {
    match value_type {
        ValueType::String => Value::String(String::new()),
        ValueType::Bool => Value::Bool(false),
        ValueType::Int => Value::Int(0),
        ValueType::Float => Value::Float(0.0),
        ValueType::StringList => Value::StringList(Vec::new()),
    }
}
