//! Shared fixtures for integration tests
//!
//! Provides an in-memory store carrying the MATE schemas the built-in
//! profile writes to, and helpers for building settings.

#![allow(dead_code)]

use tweakset::config::{EffectiveConfig, Settings};
use tweakset::store::{KeyInfo, MemoryStore, SchemaInfo};
use tweakset::{ResolvedAddress, Value, ValueType};

pub const PANEL_SCHEMA: &str = "org.mate.panel";
pub const REGISTRY_KEY: &str = "object-id-list";

/// Registry contents a stock MATE panel starts with
pub fn stock_registry() -> Vec<String> {
    ["menu-bar", "notification-area", "object-0", "clock", "window-list"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn registry_address() -> ResolvedAddress {
    ResolvedAddress::schema(PANEL_SCHEMA)
}

fn bool_key() -> KeyInfo {
    KeyInfo::new(ValueType::Bool)
}

fn string_key() -> KeyInfo {
    KeyInfo::new(ValueType::String)
}

/// Every schema the built-in profile touches
pub fn mate_schemas() -> Vec<SchemaInfo> {
    vec![
        SchemaInfo::new("org.mate.background")
            .with_key("picture-filename", string_key())
            .with_key("show-desktop-icons", bool_key()),
        SchemaInfo::new("org.mate.power-manager").with_key(
            "button-lid-ac",
            KeyInfo::choice(["blank", "suspend", "shutdown", "hibernate", "interactive", "nothing"]),
        ),
        SchemaInfo::new("org.mate.screensaver")
            .with_key("lock-enabled", bool_key())
            .with_key("idle-activation-enabled", bool_key()),
        SchemaInfo::new("org.mate.Marco.general")
            .with_key("theme", string_key())
            .with_key("compositing-manager", bool_key()),
        SchemaInfo::new("org.mate.interface").with_key("gtk-theme", string_key()),
        SchemaInfo::new("org.mate.caja.desktop").with_key("computer-icon-visible", bool_key()),
        SchemaInfo::new("org.mate.caja.preferences")
            .with_key(
                "show-image-thumbnails",
                KeyInfo::choice(["always", "local-only", "never"]),
            )
            .with_key(
                "default-folder-viewer",
                KeyInfo::choice(["icon-view", "compact-view", "list-view"]),
            )
            .with_key("date-format", KeyInfo::choice(["locale", "iso", "informal"]))
            .with_key("enable-delete", bool_key())
            .with_key("preview-sound", KeyInfo::choice(["always", "local-only", "never"]))
            .with_key("show-hidden-files", bool_key()),
        SchemaInfo::new("org.mate.panel.applet.clock")
            .relocatable()
            .with_key(
                "format",
                KeyInfo::choice(["invalid", "12-hour", "24-hour", "unix", "internet", "custom"]),
            )
            .with_key(
                "speed-unit",
                KeyInfo::choice(["Invalid", "Default", "m/s", "km/h", "mph", "knots", "Beaufort scale"]),
            )
            .with_key(
                "temperature-unit",
                KeyInfo::choice(["Invalid", "Default", "Kelvin", "Celsius", "Fahrenheit"]),
            )
            .with_key("cities", KeyInfo::new(ValueType::StringList)),
        SchemaInfo::new("org.mate.panel.object")
            .relocatable()
            .with_key("launcher-location", string_key())
            .with_key("position", KeyInfo::new(ValueType::Int))
            .with_key("toplevel-id", string_key())
            .with_key(
                "object-type",
                KeyInfo::choice(["drawer", "menu", "launcher", "applet", "action", "menu-bar", "separator"]),
            )
            .with_key("panel-right-stick", bool_key()),
        SchemaInfo::new(PANEL_SCHEMA).with_key(REGISTRY_KEY, KeyInfo::new(ValueType::StringList)),
        SchemaInfo::new("org.mate.session.required-components")
            .with_key("windowmanager", string_key())
            .with_key("panel", string_key()),
    ]
}

/// A store with every MATE schema and a stock panel registry
pub fn mate_store() -> MemoryStore {
    mate_schemas()
        .into_iter()
        .fold(MemoryStore::new(), MemoryStore::with_schema)
        .with_value(
            &registry_address(),
            REGISTRY_KEY,
            Value::StringList(stock_registry()),
        )
}

/// Like [`mate_store`] without one schema installed
pub fn mate_store_without(schema: &str) -> MemoryStore {
    mate_schemas()
        .into_iter()
        .filter(|s| s.id != schema)
        .fold(MemoryStore::new(), MemoryStore::with_schema)
}

/// Settings from built-in defaults plus the given overrides
pub fn settings(overrides: serde_json::Value) -> Settings {
    EffectiveConfig::build(None, None, Some(overrides))
        .expect("config should build")
        .settings()
        .expect("settings should deserialize")
}
