//! Tool configuration
//!
//! Layered configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/tweakset/config.toml)
//! 3. Explicit config file (--config)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    DocumentPaths, LoggingSettings, PanelSettings, ProfileSettings, Settings, StoreSettings,
    WindowManager,
};
