//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Wallpaper image (default: "/home/user/Wallpaper/good-art.jpg")
    pub picture_filename: String,

    /// GTK and window manager theme (default: "BlackMATE")
    pub theme: String,

    /// Window manager to run (default: "i3")
    pub window_manager: String,

    /// Schema holding the panel object registry (default: "org.mate.panel")
    pub panel_schema: String,

    /// Registry key (default: "object-id-list")
    pub panel_key: String,

    /// Prefix of generated launcher ids (default: "object-")
    pub stale_prefix: String,

    /// Store tool (default: "gsettings")
    pub store_program: String,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            picture_filename: "/home/user/Wallpaper/good-art.jpg".to_string(),
            theme: "BlackMATE".to_string(),
            window_manager: "i3".to_string(),
            panel_schema: "org.mate.panel".to_string(),
            panel_key: "object-id-list".to_string(),
            stale_prefix: "object-".to_string(),
            store_program: "gsettings".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": {
                "picture_filename": self.picture_filename,
                "theme": self.theme,
                "window_manager": self.window_manager
            },
            "documents": {},
            "panel": {
                "schema": self.panel_schema,
                "key": self.panel_key,
                "stale_prefix": self.stale_prefix
            },
            "store": {
                "program": self.store_program
            },
            "logging": {
                "level": self.log_level
            }
        })
    }
}
