//! `gsettings` tool backend
//!
//! Drives the session's settings store through the `gsettings` command
//! line tool. Schema metadata comes from `list-schemas`,
//! `list-relocatable-schemas`, `list-keys` and `range`, and is cached for
//! the life of the store.
//!
//! Writes are queued and only reach the store when [`SettingsStore::sync`]
//! flushes them, one `gsettings set` per write, in order.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;
use tweakset_variant::{Value, ValueType};

use super::{KeyInfo, SchemaInfo, SettingsStore, StoreError};
use crate::address::ResolvedAddress;

/// A write waiting for the next sync.
#[derive(Debug, Clone)]
struct PendingWrite {
    target: String,
    key: String,
    text: String,
}

/// Settings store backed by the `gsettings` tool.
#[derive(Debug)]
pub struct GsettingsStore {
    program: PathBuf,

    /// Installed schema ids mapped to whether they are relocatable
    installed: Option<HashMap<String, bool>>,

    metadata: HashMap<String, SchemaInfo>,
    pending: Vec<PendingWrite>,
}

impl GsettingsStore {
    /// Use the `gsettings` found on `PATH`.
    pub fn new() -> Self {
        Self::with_program("gsettings")
    }

    /// Use a specific `gsettings` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            installed: None,
            metadata: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Number of writes waiting for a sync.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    fn run(&self, args: &[&str]) -> Result<String, StoreError> {
        debug!(program = %self.program.display(), ?args, "gsettings");

        let output = Command::new(&self.program).args(args).output().map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to run {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr, args, output.status.to_string()));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| StoreError::Protocol(format!("non UTF-8 output: {}", e)))
    }

    fn installed(&mut self) -> Result<&HashMap<String, bool>, StoreError> {
        if self.installed.is_none() {
            let mut installed = HashMap::new();
            for id in self.run(&["list-schemas"])?.lines().map(str::trim) {
                if !id.is_empty() {
                    installed.insert(id.to_string(), false);
                }
            }
            for id in self.run(&["list-relocatable-schemas"])?.lines().map(str::trim) {
                if !id.is_empty() {
                    installed.insert(id.to_string(), true);
                }
            }
            self.installed = Some(installed);
        }

        Ok(self.installed.get_or_insert_with(HashMap::new))
    }

    fn load_schema(&mut self, schema: &str) -> Result<SchemaInfo, StoreError> {
        let relocatable = *self
            .installed()?
            .get(schema)
            .ok_or_else(|| StoreError::SchemaNotFound(schema.to_string()))?;

        let mut keys = BTreeMap::new();
        let mut unsupported = BTreeMap::new();
        for key in self.run(&["list-keys", schema])?.lines().map(str::trim) {
            if key.is_empty() {
                continue;
            }
            let range = self.run(&["range", schema, key])?;
            match parse_range(&range) {
                Ok(info) => {
                    keys.insert(key.to_string(), info);
                }
                // Only fatal once a document touches the key
                Err(StoreError::Variant(e)) => {
                    debug!(schema, key, error = %e, "skipping key with unsupported type");
                    unsupported.insert(key.to_string(), e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(SchemaInfo {
            id: schema.to_string(),
            relocatable,
            keys,
            unsupported,
        })
    }

    fn key_type(&mut self, address: &ResolvedAddress, key: &str) -> Result<ValueType, StoreError> {
        Ok(self.schema(&address.schema)?.require_key(key)?.value_type)
    }
}

impl Default for GsettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for GsettingsStore {
    fn schema(&mut self, schema: &str) -> Result<SchemaInfo, StoreError> {
        if let Some(info) = self.metadata.get(schema) {
            return Ok(info.clone());
        }
        let info = self.load_schema(schema)?;
        self.metadata.insert(schema.to_string(), info.clone());
        Ok(info)
    }

    fn write(&mut self, address: &ResolvedAddress, key: &str, value: &Value) -> Result<(), StoreError> {
        let expected = self.key_type(address, key)?;
        if expected != value.value_type() {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: format!("expected {}, got {}", expected, value.value_type()),
            });
        }

        self.pending.push(PendingWrite {
            target: address.to_string(),
            key: key.to_string(),
            text: tweakset_variant::format(value),
        });
        Ok(())
    }

    fn read(&mut self, address: &ResolvedAddress, key: &str) -> Result<Value, StoreError> {
        let value_type = self.key_type(address, key)?;
        let target = address.to_string();
        let text = self.run(&["get", &target, key])?;
        Ok(tweakset_variant::parse(&text, value_type)?)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        for write in std::mem::take(&mut self.pending) {
            self.run(&["set", &write.target, &write.key, &write.text])
                .map_err(|e| StoreError::Sync(format!("{} {}: {}", write.target, write.key, e)))?;
        }
        Ok(())
    }
}

/// Map a failed invocation's stderr onto a store error.
fn classify_failure(stderr: &str, args: &[&str], status: String) -> StoreError {
    // gsettings prints "No such schema" / "No such key" for unknown names
    let schema = args.get(1).map(|s| s.split(':').next().unwrap_or(*s));
    if stderr.contains("No such schema") {
        if let Some(schema) = schema {
            return StoreError::SchemaNotFound(schema.to_string());
        }
    }
    if stderr.contains("No such key") {
        if let (Some(schema), Some(key)) = (schema, args.get(2)) {
            return StoreError::KeyNotInSchema {
                schema: schema.to_string(),
                key: key.to_string(),
            };
        }
    }
    if let (Some(&"set"), Some(key)) = (args.first(), args.get(2)) {
        return StoreError::WriteRejected {
            key: key.to_string(),
            reason: stderr.trim().to_string(),
        };
    }
    StoreError::Unavailable(format!("gsettings exited with {}: {}", status, stderr.trim()))
}

/// Parse the output of `gsettings range SCHEMA KEY`.
///
/// The tool prints one of:
/// - `type <signature>`
/// - `enum` followed by one quoted choice per line
/// - `flags` followed by one quoted choice per line
/// - `range <signature> <min> <max>`
pub(crate) fn parse_range(output: &str) -> Result<KeyInfo, StoreError> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| StoreError::Protocol("empty range output".to_string()))?;
    let mut words = header.split_whitespace();

    match words.next() {
        Some("type") => {
            let signature = words
                .next()
                .ok_or_else(|| StoreError::Protocol(format!("missing signature in '{}'", header)))?;
            Ok(KeyInfo::new(ValueType::from_signature(signature)?))
        }
        Some(kind @ ("enum" | "flags")) => {
            let choices = lines
                .map(|line| tweakset_variant::parse(line, ValueType::String))
                .map(|parsed| -> Result<String, StoreError> {
                    match parsed? {
                        Value::String(s) => Ok(s),
                        other => Err(StoreError::Protocol(format!("unexpected choice {}", other))),
                    }
                })
                .collect::<Result<Vec<_>, StoreError>>()?;
            let mut info = KeyInfo::choice(choices);
            if kind == "flags" {
                info.value_type = ValueType::StringList;
            }
            Ok(info)
        }
        Some("range") => {
            let parts: Vec<&str> = words.collect();
            let [signature, min, max] = parts.as_slice() else {
                return Err(StoreError::Protocol(format!("malformed range '{}'", header)));
            };
            let value_type = ValueType::from_signature(signature)?;
            if value_type != ValueType::Int {
                return Ok(KeyInfo::new(value_type));
            }
            // `t` bounds may exceed i64
            let bound = |text: &str| {
                text.parse::<i128>()
                    .map(|n| n.clamp(i64::MIN.into(), i64::MAX.into()) as i64)
                    .map_err(|_| StoreError::Protocol(format!("bad range bound '{}'", text)))
            };
            Ok(KeyInfo::ranged(bound(*min)?, bound(*max)?))
        }
        _ => Err(StoreError::Protocol(format!("unknown range kind '{}'", header))),
    }
}
