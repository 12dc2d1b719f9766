//! Settings applier
//!
//! Writes one entry's values through a [`SettingsHandle`] bound to the
//! entry's address, then syncs once. The sync is the commit point: writes
//! are not individually durable before it.
//!
//! Entries are not atomic. If a write fails partway through, the handle
//! still flushes on drop, so the keys written before the failure stay in
//! effect. Callers coerce every value up front (see
//! [`crate::coerce::coerce_entry`]) so type and key errors surface before
//! the first write.

use serde::Serialize;
use tracing::{info, warn};
use tweakset_variant::Value;

use crate::address::ResolvedAddress;
use crate::coerce::{CoercionError, EntryCoercionError};
use crate::store::{SchemaInfo, SettingsStore, StoreError};

/// Applier errors
///
/// Every variant names the address (`schema` or `schema:path`) it failed
/// on, and the key where one was involved.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("schema not found: {address}")]
    SchemaNotFound { address: String },

    #[error("{address}: key '{key}' is not in the schema")]
    KeyNotInSchema { address: String, key: String },

    #[error("{address}: key '{key}': {source}")]
    TypeConversion {
        address: String,
        key: String,
        #[source]
        source: CoercionError,
    },

    #[error("{address}: {reason}")]
    AddressMismatch { address: String, reason: String },

    #[error("{address}: write of '{key}' rejected: {reason}")]
    Write {
        address: String,
        key: String,
        reason: String,
    },

    #[error("{address}: sync failed: {reason}")]
    Sync { address: String, reason: String },

    #[error("{address}: {source}")]
    Store {
        address: String,
        #[source]
        source: StoreError,
    },
}

impl ApplyError {
    /// Attach address context to a store error.
    pub fn from_store(address: &ResolvedAddress, err: StoreError) -> Self {
        let address = address.to_string();
        match err {
            StoreError::SchemaNotFound(_) => ApplyError::SchemaNotFound { address },
            StoreError::KeyNotInSchema { key, .. } => ApplyError::KeyNotInSchema { address, key },
            StoreError::UnsupportedKey { key, reason, .. } => ApplyError::TypeConversion {
                address,
                key,
                source: CoercionError::Unsupported(reason),
            },
            StoreError::WriteRejected { key, reason } => ApplyError::Write {
                address,
                key,
                reason,
            },
            StoreError::Sync(reason) => ApplyError::Sync { address, reason },
            source => ApplyError::Store { address, source },
        }
    }

    /// Attach address context to an entry coercion error.
    pub fn from_coercion(address: &ResolvedAddress, err: EntryCoercionError) -> Self {
        let address = address.to_string();
        match err {
            EntryCoercionError::UnknownKey { key, .. } => ApplyError::KeyNotInSchema { address, key },
            EntryCoercionError::Invalid { key, source } => ApplyError::TypeConversion {
                address,
                key,
                source,
            },
        }
    }
}

/// What one successful apply wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    pub address: ResolvedAddress,
    pub keys: Vec<String>,
}

/// Scoped write access to one address.
///
/// Dropping the handle without calling [`SettingsHandle::sync`] still
/// flushes the store, so partial writes are committed on error paths too.
pub struct SettingsHandle<'s, S: SettingsStore + ?Sized> {
    store: &'s mut S,
    address: ResolvedAddress,
    schema: SchemaInfo,
    written: Vec<String>,
    flushed: bool,
}

impl<'s, S: SettingsStore + ?Sized> SettingsHandle<'s, S> {
    /// Bind a handle to `address`, checking the schema exists and the path
    /// form matches whether the schema is relocatable.
    pub fn open(store: &'s mut S, address: &ResolvedAddress) -> Result<Self, ApplyError> {
        let schema = store
            .schema(&address.schema)
            .map_err(|e| ApplyError::from_store(address, e))?;
        check_address(&schema, address)?;

        Ok(Self {
            store,
            address: address.clone(),
            schema,
            written: Vec::new(),
            flushed: false,
        })
    }

    /// Write one key through the handle.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<(), ApplyError> {
        self.schema
            .require_key(key)
            .map_err(|e| ApplyError::from_store(&self.address, e))?;

        self.store
            .write(&self.address, key, value)
            .map_err(|e| ApplyError::from_store(&self.address, e))?;
        info!("    {}: {}", key, value);
        self.written.push(key.to_string());
        Ok(())
    }

    /// Commit every write made through this handle.
    ///
    /// Returns the keys written, in order.
    pub fn sync(mut self) -> Result<Vec<String>, ApplyError> {
        self.flushed = true;
        self.store
            .sync()
            .map_err(|e| ApplyError::from_store(&self.address, e))?;
        Ok(std::mem::take(&mut self.written))
    }
}

impl<'s, S: SettingsStore + ?Sized> Drop for SettingsHandle<'s, S> {
    fn drop(&mut self) {
        if self.flushed {
            return;
        }
        if let Err(e) = self.store.sync() {
            warn!(address = %self.address, error = %e, "flush of partial entry failed");
        } else if !self.written.is_empty() {
            warn!(address = %self.address, keys = ?self.written, "flushed partial entry");
        }
    }
}

/// Write `values` at `address` and sync once.
///
/// An empty `values` still syncs.
pub fn apply<S: SettingsStore + ?Sized>(
    store: &mut S,
    address: &ResolvedAddress,
    values: &[(String, Value)],
) -> Result<ApplyReport, ApplyError> {
    info!("Setting schema: '{}'", address.schema);
    if let Some(path) = &address.path {
        info!("    path {}", path);
    }

    let mut handle = SettingsHandle::open(store, address)?;
    for (key, value) in values {
        handle.set(key, value)?;
    }
    let keys = handle.sync()?;

    Ok(ApplyReport {
        address: address.clone(),
        keys,
    })
}

fn check_address(schema: &SchemaInfo, address: &ResolvedAddress) -> Result<(), ApplyError> {
    let mismatch = |reason: &str| ApplyError::AddressMismatch {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    match (&address.path, schema.relocatable) {
        (None, true) => Err(mismatch("schema is relocatable, a path must be specified")),
        (Some(_), false) => Err(mismatch("schema is not relocatable, a path must not be specified")),
        (Some(path), true) if !is_valid_path(path) => Err(mismatch(
            "path must start and end with '/' and contain no empty segments",
        )),
        _ => Ok(()),
    }
}

fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && path.ends_with('/') && !path.contains("//")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyInfo, MemoryStore, StoreOp};
    use tweakset_variant::ValueType;

    fn caja() -> ResolvedAddress {
        ResolvedAddress::schema("org.mate.caja.preferences")
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_schema(
                SchemaInfo::new("org.mate.caja.preferences")
                    .with_key("show-hidden-files", KeyInfo::new(ValueType::Bool))
                    .with_key("enable-delete", KeyInfo::new(ValueType::Bool))
                    .with_key("preview-sound", KeyInfo::choice(["always", "never"])),
            )
            .with_schema(
                SchemaInfo::new("org.mate.panel.object")
                    .relocatable()
                    .with_key("position", KeyInfo::new(ValueType::Int)),
            )
    }

    fn values(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_apply_writes_then_syncs_once() {
        let mut store = store();
        let report = apply(
            &mut store,
            &caja(),
            &values(&[
                ("show-hidden-files", Value::Bool(true)),
                ("enable-delete", Value::Bool(true)),
            ]),
        )
        .unwrap();

        assert_eq!(report.keys, vec!["show-hidden-files", "enable-delete"]);
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.sync_count(), 1);
        assert_eq!(store.journal().last(), Some(&StoreOp::Sync));
    }

    #[test]
    fn test_empty_values_still_sync() {
        let mut store = store();
        let report = apply(&mut store, &caja(), &[]).unwrap();

        assert!(report.keys.is_empty());
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn test_unknown_schema() {
        let mut store = store();
        let err = apply(&mut store, &ResolvedAddress::schema("org.mate.nope"), &[]).unwrap_err();
        assert!(matches!(err, ApplyError::SchemaNotFound { address } if address == "org.mate.nope"));
        assert_eq!(store.sync_count(), 0);
    }

    #[test]
    fn test_unknown_key_names_address_and_key() {
        let mut store = store();
        let err = apply(
            &mut store,
            &caja(),
            &values(&[("thumbnails", Value::Bool(true))]),
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "org.mate.caja.preferences: key 'thumbnails' is not in the schema"
        );
    }

    #[test]
    fn test_failed_write_leaves_earlier_keys_committed() {
        let mut store = store();
        store.fail_write("enable-delete", "key is not writable");

        let err = apply(
            &mut store,
            &caja(),
            &values(&[
                ("show-hidden-files", Value::Bool(true)),
                ("enable-delete", Value::Bool(true)),
                ("preview-sound", Value::String("never".into())),
            ]),
        )
        .unwrap_err();

        assert!(matches!(err, ApplyError::Write { ref key, .. } if key == "enable-delete"));
        assert_eq!(
            store.durable_value(&caja(), "show-hidden-files"),
            Some(&Value::Bool(true))
        );
        assert_eq!(store.value(&caja(), "preview-sound"), None);
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn test_sync_failure() {
        let mut store = store();
        store.fail_sync("disk full");

        let err = apply(
            &mut store,
            &caja(),
            &values(&[("show-hidden-files", Value::Bool(true))]),
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::Sync { reason, .. } if reason == "disk full"));
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn test_relocatable_schema_requires_path() {
        let mut store = store();
        let err = apply(&mut store, &ResolvedAddress::schema("org.mate.panel.object"), &[]).unwrap_err();
        assert!(matches!(err, ApplyError::AddressMismatch { .. }));

        let err = apply(
            &mut store,
            &ResolvedAddress::relocated("org.mate.caja.preferences", "/org/mate/caja/"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::AddressMismatch { .. }));

        let err = apply(
            &mut store,
            &ResolvedAddress::relocated("org.mate.panel.object", "org/mate/panel/objects/object-1"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::AddressMismatch { .. }));
    }

    #[test]
    fn test_dropped_handle_flushes() {
        let mut store = store();
        let address = ResolvedAddress::relocated("org.mate.panel.object", "/org/mate/panel/objects/object-1/");
        {
            let mut handle = SettingsHandle::open(&mut store, &address).unwrap();
            handle.set("position", &Value::Int(237)).unwrap();
        }

        assert_eq!(store.sync_count(), 1);
        assert_eq!(store.durable_value(&address, "position"), Some(&Value::Int(237)));
    }
}
