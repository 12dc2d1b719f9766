//! Desktop profile documents
//!
//! A profile is three documents applied in a fixed order: primary
//! settings, panel launchers and the window manager switch. Defaults are
//! built in; each can be replaced by a file named in the configuration.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::Settings;
use crate::document::{ConfigDocument, DocumentError, TemplateVars};
use crate::launcher::{LauncherBatch, LauncherNaming};
use crate::pipeline::{PipelineError, PipelineResult};

const SETTINGS_DOCUMENT: &str = include_str!("../profiles/settings.yaml");
const LAUNCHERS_DOCUMENT: &str = include_str!("../profiles/launchers.yaml");
const WINDOW_MANAGER_DOCUMENT: &str = include_str!("../profiles/window-manager.yaml");

/// Rendered and validated profile documents
#[derive(Debug, Clone)]
pub struct Profile {
    pub settings: ConfigDocument,
    pub launchers: LauncherBatch,
    pub window_manager: ConfigDocument,
}

impl Profile {
    /// Load, render and validate every document for `settings`.
    pub fn load(settings: &Settings) -> PipelineResult<Self> {
        let vars = settings.profile.template_vars();
        let paths = &settings.documents;

        let primary = load_document(
            "settings",
            paths.settings.as_deref(),
            SETTINGS_DOCUMENT,
            &vars,
        )?;
        let launchers = load_document(
            "launchers",
            paths.launchers.as_deref(),
            LAUNCHERS_DOCUMENT,
            &vars,
        )?;
        let window_manager = load_document(
            "window manager",
            paths.window_manager.as_deref(),
            WINDOW_MANAGER_DOCUMENT,
            &vars,
        )?;

        let naming = LauncherNaming::new(&settings.panel.stale_prefix)?;
        let launchers = LauncherBatch::from_document(launchers, &naming)?;

        Ok(Self {
            settings: primary,
            launchers,
            window_manager,
        })
    }
}

fn load_document(
    name: &str,
    path: Option<&Path>,
    builtin: &str,
    vars: &TemplateVars,
) -> PipelineResult<ConfigDocument> {
    let template = match path {
        Some(path) => {
            debug!(document = name, path = %path.display(), "loading document");
            fs::read_to_string(path).map_err(|source| {
                PipelineError::document(
                    name,
                    DocumentError::Io {
                        path: path.to_path_buf(),
                        source,
                    },
                )
            })?
        }
        None => builtin.to_string(),
    };

    ConfigDocument::render(&template, vars).map_err(|e| PipelineError::document(name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ResolvedAddress;
    use crate::config::EffectiveConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tweakset_variant::Value;

    fn settings(cli: serde_json::Value) -> Settings {
        EffectiveConfig::build(None, None, Some(cli))
            .unwrap()
            .settings()
            .unwrap()
    }

    #[test]
    fn test_builtin_profile() {
        let profile = Profile::load(&settings(serde_json::json!({}))).unwrap();

        assert_eq!(profile.settings.entries.len(), 8);
        assert_eq!(
            profile.settings.entries[0].values[0],
            (
                "picture-filename".to_string(),
                Value::String("/home/user/Wallpaper/good-art.jpg".into())
            )
        );
        assert_eq!(
            profile.launchers.ids,
            vec!["object-5", "object-1", "object-10", "object-2"]
        );
        assert_eq!(
            profile.window_manager.entries[0].values[0].1,
            Value::String("i3".into())
        );
        assert_eq!(
            profile.window_manager.entries[1].values[0].1,
            Value::Bool(false)
        );
    }

    #[test]
    fn test_theme_and_window_manager_substituted() {
        let profile = Profile::load(&settings(serde_json::json!({
            "profile": {"theme": "Menta", "window_manager": "marco"}
        })))
        .unwrap();

        let interface = profile
            .settings
            .entries
            .iter()
            .find(|e| e.address() == ResolvedAddress::schema("org.mate.interface"))
            .unwrap();
        assert_eq!(interface.values[0].1, Value::String("Menta".into()));
        assert_eq!(
            profile.window_manager.entries[1].values[0].1,
            Value::Bool(true)
        );
    }

    fn interface_theme(profile: &Profile) -> &Value {
        let interface = profile
            .settings
            .entries
            .iter()
            .find(|e| e.address() == ResolvedAddress::schema("org.mate.interface"))
            .unwrap();
        &interface.values[0].1
    }

    #[test]
    fn test_substituted_text_stays_verbatim() {
        let profile = Profile::load(&settings(serde_json::json!({
            "profile": {"picture_filename": "/home/u/art #2.jpg", "theme": "1.10"}
        })))
        .unwrap();
        assert_eq!(
            profile.settings.entries[0].values[0].1,
            Value::String("/home/u/art #2.jpg".into())
        );
        assert_eq!(interface_theme(&profile), &Value::String("1.10".into()));

        let profile = Profile::load(&settings(serde_json::json!({
            "profile": {"theme": "Dark: Blue"}
        })))
        .unwrap();
        assert_eq!(interface_theme(&profile), &Value::String("Dark: Blue".into()));
    }

    #[test]
    fn test_document_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "org.mate.interface:\n  value:\n    gtk-theme: ${{theme}}").unwrap();

        let profile = Profile::load(&settings(serde_json::json!({
            "documents": {"settings": file.path()}
        })))
        .unwrap();
        assert_eq!(profile.settings.entries.len(), 1);
        assert_eq!(
            profile.settings.entries[0].values[0].1,
            Value::String("BlackMATE".into())
        );
    }

    #[test]
    fn test_missing_override_is_document_error() {
        let err = Profile::load(&settings(serde_json::json!({
            "documents": {"launchers": "/nonexistent/launchers.yaml"}
        })))
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_launcher_naming_follows_stale_prefix() {
        let err = Profile::load(&settings(serde_json::json!({
            "panel": {"stale_prefix": "launcher-"}
        })))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Launcher(_)));
    }
}
