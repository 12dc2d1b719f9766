//! Typed view of the merged configuration

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tweakset_variant::Value;

use crate::document::TemplateVars;

/// Window manager the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowManager {
    I3,
    Marco,
}

impl WindowManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowManager::I3 => "i3",
            WindowManager::Marco => "marco",
        }
    }

    /// Whether the desktop draws icons under this window manager.
    pub fn shows_desktop_icons(&self) -> bool {
        matches!(self, WindowManager::Marco)
    }
}

impl fmt::Display for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desktop profile values substituted into documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    pub picture_filename: String,
    pub theme: String,
    pub window_manager: WindowManager,

    /// Defaults from the window manager when unset
    #[serde(default)]
    pub show_desktop_icons: Option<bool>,
}

impl ProfileSettings {
    pub fn show_desktop_icons(&self) -> bool {
        self.show_desktop_icons
            .unwrap_or_else(|| self.window_manager.shows_desktop_icons())
    }

    /// Variables available to `${name}` placeholders.
    pub fn template_vars(&self) -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.insert(
            "picture_filename".to_string(),
            Value::String(self.picture_filename.clone()),
        );
        vars.insert("theme".to_string(), Value::String(self.theme.clone()));
        vars.insert(
            "window_manager".to_string(),
            Value::String(self.window_manager.to_string()),
        );
        vars.insert(
            "show_desktop_icons".to_string(),
            Value::Bool(self.show_desktop_icons()),
        );
        vars
    }
}

/// Replacement document files; unset ones use the embedded defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPaths {
    #[serde(default)]
    pub settings: Option<PathBuf>,
    #[serde(default)]
    pub launchers: Option<PathBuf>,
    #[serde(default)]
    pub window_manager: Option<PathBuf>,
}

/// Where the panel keeps its launcher registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSettings {
    pub schema: String,
    pub key: String,
    pub stale_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub program: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

/// All tool settings, after layering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub profile: ProfileSettings,
    #[serde(default)]
    pub documents: DocumentPaths,
    pub panel: PanelSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(window_manager: WindowManager) -> ProfileSettings {
        ProfileSettings {
            picture_filename: "/tmp/art.jpg".to_string(),
            theme: "BlackMATE".to_string(),
            window_manager,
            show_desktop_icons: None,
        }
    }

    #[test]
    fn test_desktop_icons_follow_window_manager() {
        assert!(!profile(WindowManager::I3).show_desktop_icons());
        assert!(profile(WindowManager::Marco).show_desktop_icons());

        let mut explicit = profile(WindowManager::I3);
        explicit.show_desktop_icons = Some(true);
        assert!(explicit.show_desktop_icons());
    }

    #[test]
    fn test_template_vars() {
        let vars = profile(WindowManager::Marco).template_vars();
        assert_eq!(vars["window_manager"], Value::String("marco".into()));
        assert_eq!(vars["show_desktop_icons"], Value::Bool(true));
        assert_eq!(vars["picture_filename"], Value::String("/tmp/art.jpg".into()));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_window_manager_names() {
        let wm: WindowManager = serde_json::from_value(serde_json::json!("marco")).unwrap();
        assert_eq!(wm, WindowManager::Marco);
        assert!(serde_json::from_value::<WindowManager>(serde_json::json!("xmonad")).is_err());
    }
}
