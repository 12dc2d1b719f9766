//! Pipeline orchestration
//!
//! Runs a desktop profile against a settings store:
//! - Primary settings document, entry by entry
//! - Launcher entries, then the panel registry merge
//! - Window manager document
//!
//! Entries run strictly in order and the first error stops the run.
//! Nothing is retried or rolled back.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use tweakset_variant::Value;

use crate::address::ResolvedAddress;
use crate::apply::{apply, ApplyError, ApplyReport};
use crate::coerce::coerce_entry;
use crate::config::{ConfigError, PanelSettings};
use crate::document::{ConfigDocument, ConfigEntry, DocumentError};
use crate::launcher::{merge, LauncherBatch, LauncherError};
use crate::profile::Profile;
use crate::store::{SettingsStore, StoreError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{document} document: {source}")]
    Document {
        document: String,
        #[source]
        source: DocumentError,
    },

    #[error("launcher error: {0}")]
    Launcher(#[from] LauncherError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Pipeline result type
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::Document { .. } | PipelineError::Launcher(_) => 2,
            PipelineError::Apply(e) => match e {
                ApplyError::SchemaNotFound { .. } => 3,
                ApplyError::KeyNotInSchema { .. } => 4,
                ApplyError::TypeConversion { .. } => 5,
                ApplyError::AddressMismatch { .. } => 6,
                ApplyError::Write { .. } => 7,
                ApplyError::Sync { .. } => 8,
                ApplyError::Store { .. } => 9,
            },
        }
    }

    pub fn document(document: impl Into<String>, source: DocumentError) -> Self {
        PipelineError::Document {
            document: document.into(),
            source,
        }
    }
}

/// Outcome of the launcher batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LauncherReport {
    pub entries: Vec<ApplyReport>,

    /// Registry list as written
    pub registry: Vec<String>,
}

/// Everything a full run applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub settings: Vec<ApplyReport>,
    pub launchers: LauncherReport,
    pub window_manager: Vec<ApplyReport>,
}

/// Resolve, coerce and apply one entry.
///
/// Every value is coerced against the schema before the first write.
pub fn apply_entry<S: SettingsStore + ?Sized>(
    store: &mut S,
    entry: &ConfigEntry,
) -> Result<ApplyReport, ApplyError> {
    let address = entry.address();
    let schema = store
        .schema(&address.schema)
        .map_err(|e| ApplyError::from_store(&address, e))?;
    let values = coerce_entry(&schema, &entry.values)
        .map_err(|e| ApplyError::from_coercion(&address, e))?;
    apply(store, &address, &values)
}

/// Apply every entry of a document in order.
pub fn apply_document<S: SettingsStore + ?Sized>(
    store: &mut S,
    document: &ConfigDocument,
) -> Result<Vec<ApplyReport>, ApplyError> {
    document
        .entries
        .iter()
        .map(|entry| apply_entry(store, entry))
        .collect()
}

/// Apply the launcher entries, then merge their identifiers into the
/// panel registry and write it back as a single-key entry.
pub fn apply_launchers<S: SettingsStore + ?Sized>(
    store: &mut S,
    batch: &LauncherBatch,
    panel: &PanelSettings,
) -> Result<LauncherReport, ApplyError> {
    let mut entries = Vec::with_capacity(batch.entries.len());
    for entry in &batch.entries {
        entries.push(apply_entry(store, entry)?);
    }

    let address = ResolvedAddress::schema(&panel.schema);
    let existing = read_registry(store, &address, &panel.key)?;
    let registry = merge(&existing, &batch.ids, &panel.stale_prefix);
    debug!(before = ?existing, after = ?registry, "merged launcher registry");

    let entry = ConfigEntry::new(panel.schema.as_str())
        .with_value(panel.key.as_str(), Value::StringList(registry.clone()));
    apply_entry(store, &entry)?;

    Ok(LauncherReport { entries, registry })
}

fn read_registry<S: SettingsStore + ?Sized>(
    store: &mut S,
    address: &ResolvedAddress,
    key: &str,
) -> Result<Vec<String>, ApplyError> {
    let current = store
        .read(address, key)
        .map_err(|e| ApplyError::from_store(address, e))?;
    match current {
        Value::StringList(items) => Ok(items),
        other => Err(ApplyError::from_store(
            address,
            StoreError::Protocol(format!(
                "registry key '{}' holds {}, expected a string list",
                key,
                other.value_type()
            )),
        )),
    }
}

/// Run the whole profile: settings, launchers, then window manager.
pub fn run_profile<S: SettingsStore + ?Sized>(
    store: &mut S,
    profile: &Profile,
    panel: &PanelSettings,
) -> PipelineResult<RunReport> {
    let settings = apply_document(store, &profile.settings)?;
    let launchers = apply_launchers(store, &profile.launchers, panel)?;
    let window_manager = apply_document(store, &profile.window_manager)?;

    let report = RunReport {
        settings,
        launchers,
        window_manager,
    };
    info!("completed settings");
    Ok(report)
}

/// One key as it would be written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedValue {
    pub key: String,
    pub value: Value,
}

/// One entry as it would be applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedEntry {
    pub batch: &'static str,
    pub address: ResolvedAddress,
    pub values: Vec<PlannedValue>,
}

/// Resolved view of a profile, computed without touching the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub entries: Vec<PlannedEntry>,

    /// Identifiers the launcher batch adds to the registry
    pub launcher_ids: Vec<String>,

    /// Registry entries containing this are replaced
    pub stale_pattern: String,
}

/// Resolve every entry of a profile without writing anything.
pub fn plan(profile: &Profile, panel: &PanelSettings) -> Plan {
    let batches = [
        ("settings", profile.settings.entries.as_slice()),
        ("launchers", profile.launchers.entries.as_slice()),
        ("window_manager", profile.window_manager.entries.as_slice()),
    ];

    let entries = batches
        .into_iter()
        .flat_map(|(batch, entries)| {
            entries.iter().map(move |entry| PlannedEntry {
                batch,
                address: entry.address(),
                values: entry
                    .values
                    .iter()
                    .map(|(key, value)| PlannedValue {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            })
        })
        .collect();

    Plan {
        entries,
        launcher_ids: profile.launchers.ids.clone(),
        stale_pattern: panel.stale_prefix.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyInfo, MemoryStore, SchemaInfo};
    use crate::coerce::CoercionError;
    use tweakset_variant::ValueType;

    fn panel() -> PanelSettings {
        PanelSettings {
            schema: "org.mate.panel".to_string(),
            key: "object-id-list".to_string(),
            stale_prefix: "object-".to_string(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_schema(
                SchemaInfo::new("org.mate.screensaver")
                    .with_key("lock-enabled", KeyInfo::new(ValueType::Bool))
                    .with_key("idle-delay", KeyInfo::ranged(1, 120)),
            )
            .with_schema(
                SchemaInfo::new("org.mate.panel")
                    .with_key("object-id-list", KeyInfo::new(ValueType::StringList)),
            )
            .with_schema(
                SchemaInfo::new("org.mate.panel.object")
                    .relocatable()
                    .with_key("position", KeyInfo::new(ValueType::Int)),
            )
    }

    #[test]
    fn test_apply_entry_coerces_before_writing() {
        let mut store = store();
        let entry = ConfigEntry::new("org.mate.screensaver")
            .with_value("lock-enabled", Value::String("no".into()))
            .with_value("idle-delay", Value::Int(500));

        let err = apply_entry(&mut store, &entry).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::TypeConversion { source: CoercionError::OutOfRange { .. }, .. }
        ));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.sync_count(), 0);
    }

    #[test]
    fn test_apply_entry_converts_tokens() {
        let mut store = store();
        let entry = ConfigEntry::new("org.mate.screensaver")
            .with_value("lock-enabled", Value::String("off".into()));

        apply_entry(&mut store, &entry).unwrap();
        assert_eq!(
            store.durable_value(&ResolvedAddress::schema("org.mate.screensaver"), "lock-enabled"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn test_document_stops_at_first_error() {
        let mut store = store();
        let document = ConfigDocument {
            entries: vec![
                ConfigEntry::new("org.mate.screensaver").with_value("lock-enabled", Value::Bool(false)),
                ConfigEntry::new("org.mate.nope").with_value("x", Value::Bool(true)),
                ConfigEntry::new("org.mate.screensaver").with_value("idle-delay", Value::Int(5)),
            ],
        };

        let err = apply_document(&mut store, &document).unwrap_err();
        assert!(matches!(err, ApplyError::SchemaNotFound { .. }));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_launchers_update_registry() {
        let registry = ResolvedAddress::schema("org.mate.panel");
        let mut store = store().with_value(
            &registry,
            "object-id-list",
            Value::StringList(vec!["menu-bar".into(), "object-3".into(), "clock".into()]),
        );
        let batch = LauncherBatch {
            entries: vec![ConfigEntry::new("/org/mate/panel/objects/object-5/")
                .with_schema("org.mate.panel.object")
                .with_value("position", Value::Int(202))],
            ids: vec!["object-5".to_string()],
        };

        let report = apply_launchers(&mut store, &batch, &panel()).unwrap();
        assert_eq!(report.registry, vec!["menu-bar", "clock", "object-5"]);
        assert_eq!(
            store.durable_value(&registry, "object-id-list"),
            Some(&Value::StringList(report.registry.clone()))
        );
        assert_eq!(store.sync_count(), 2);
    }

    #[test]
    fn test_exit_codes() {
        let apply = |e: ApplyError| PipelineError::from(e).exit_code();
        let address = || "org.mate.x".to_string();

        assert_eq!(PipelineError::Config(ConfigError::ParseError("x".into())).exit_code(), 1);
        assert_eq!(
            PipelineError::document("settings", DocumentError::NotAMapping).exit_code(),
            2
        );
        assert_eq!(
            PipelineError::Launcher(LauncherError::DuplicateId("object-1".into())).exit_code(),
            2
        );
        assert_eq!(apply(ApplyError::SchemaNotFound { address: address() }), 3);
        assert_eq!(
            apply(ApplyError::KeyNotInSchema { address: address(), key: "k".into() }),
            4
        );
        assert_eq!(
            apply(ApplyError::Sync { address: address(), reason: "r".into() }),
            8
        );
        assert_eq!(
            apply(ApplyError::Store {
                address: address(),
                source: StoreError::Unavailable("gone".into())
            }),
            9
        );
    }
}
