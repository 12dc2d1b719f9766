//! tweakset - declarative desktop settings
//!
//! Applies YAML declarations of desktop settings to the session's
//! settings store through `gsettings`: plain schema entries, relocatable
//! instance paths, and panel launchers merged into the panel's object
//! registry.

pub mod address;
pub mod apply;
pub mod coerce;
pub mod config;
pub mod document;
pub mod launcher;
pub mod logging;
pub mod pipeline;
pub mod profile;
pub mod store;

pub use address::{resolve, ResolvedAddress};
pub use apply::{apply, ApplyError, ApplyReport, SettingsHandle};
pub use coerce::{coerce, CoercionError};
pub use config::{EffectiveConfig, Settings};
pub use document::{ConfigDocument, ConfigEntry, DocumentError};
pub use launcher::{merge, LauncherBatch, LauncherError, LauncherNaming};
pub use pipeline::{run_profile, PipelineError, RunReport};
pub use profile::Profile;
pub use store::{GsettingsStore, MemoryStore, SettingsStore, StoreError};
pub use tweakset_variant::{Value, ValueType};
