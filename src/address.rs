//! Entry addressing
//!
//! A document entry is keyed either by a schema id (`org.mate.interface`)
//! or by an instance path (`/org/mate/panel/objects/clock/prefs/`) with
//! the schema named separately. Relocatable schemas are only reachable
//! through the second form.

use serde::Serialize;
use std::fmt;

/// Where an entry's keys live in the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedAddress {
    /// Schema id the keys are declared by
    pub schema: String,

    /// Instance path, present only for relocated schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ResolvedAddress {
    /// Address a schema at its own fixed path.
    pub fn schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            path: None,
        }
    }

    /// Address a relocatable schema at an explicit path.
    pub fn relocated(schema: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            path: Some(path.into()),
        }
    }
}

impl fmt::Display for ResolvedAddress {
    /// Formats in the `SCHEMA[:PATH]` syntax the `gsettings` tool takes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", self.schema, path),
            None => f.write_str(&self.schema),
        }
    }
}

/// Resolve an entry's address key and optional schema override.
///
/// With an override the key is the instance path; without one the key is
/// the schema id. An empty override is treated as absent.
pub fn resolve(address_key: &str, schema_override: Option<&str>) -> ResolvedAddress {
    match schema_override.filter(|s| !s.is_empty()) {
        Some(schema) => ResolvedAddress::relocated(schema, address_key),
        None => ResolvedAddress::schema(address_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_schema_without_override() {
        let address = resolve("org.mate.background", None);
        assert_eq!(address.schema, "org.mate.background");
        assert_eq!(address.path, None);
    }

    #[test]
    fn test_key_is_path_with_override() {
        let address = resolve(
            "/org/mate/panel/objects/clock/prefs/",
            Some("org.mate.panel.applet.clock"),
        );
        assert_eq!(address.schema, "org.mate.panel.applet.clock");
        assert_eq!(
            address.path.as_deref(),
            Some("/org/mate/panel/objects/clock/prefs/")
        );
    }

    #[test]
    fn test_empty_override_is_absent() {
        assert_eq!(resolve("org.mate.interface", Some("")), resolve("org.mate.interface", None));
    }

    #[test]
    fn test_display_uses_gsettings_syntax() {
        let address = ResolvedAddress::relocated("org.mate.panel.object", "/org/mate/panel/objects/object-5/");
        assert_eq!(
            address.to_string(),
            "org.mate.panel.object:/org/mate/panel/objects/object-5/"
        );
        assert_eq!(ResolvedAddress::schema("org.mate.panel").to_string(), "org.mate.panel");
    }
}
