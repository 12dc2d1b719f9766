//! Launcher registration
//!
//! Panel launchers are declared as entries on relocatable
//! `org.mate.panel.object` paths. Each needs its identifier listed in the
//! panel's object registry, a store-owned ordered list that is read whole,
//! merged and written back whole.
//!
//! Generated identifiers all carry a reserved prefix (`object-`), so a
//! rerun can drop every identifier a previous run generated before
//! appending the current set. The merge is therefore idempotent.

use std::collections::HashSet;

use regex_lite::Regex;

use crate::document::{ConfigDocument, ConfigEntry};

/// Launcher errors
#[derive(Debug, thiserror::Error)]
pub enum LauncherError {
    #[error("launcher '{entry}': identifier '{id}' does not match {pattern}")]
    InvalidId {
        entry: String,
        id: String,
        pattern: String,
    },

    #[error("launcher '{entry}': no identifier in path and no 'id' field")]
    MissingId { entry: String },

    #[error("launcher identifier '{0}' is declared twice")]
    DuplicateId(String),

    #[error("invalid stale prefix '{0}'")]
    InvalidPrefix(String),
}

/// Merge generated identifiers into the registry list.
///
/// Every element of `existing` containing `stale_pattern` is dropped, the
/// survivors keep their order, and `generated` is appended in order.
pub fn merge(existing: &[String], generated: &[String], stale_pattern: &str) -> Vec<String> {
    existing
        .iter()
        .filter(|id| !id.contains(stale_pattern))
        .chain(generated)
        .cloned()
        .collect()
}

/// Naming convention for generated launcher identifiers.
///
/// An identifier is the stale prefix followed by digits, e.g. `object-12`.
#[derive(Debug, Clone)]
pub struct LauncherNaming {
    prefix: String,
    pattern: Regex,
}

impl LauncherNaming {
    pub fn new(prefix: &str) -> Result<Self, LauncherError> {
        if prefix.is_empty() {
            return Err(LauncherError::InvalidPrefix(prefix.to_string()));
        }
        let pattern = Regex::new(&format!(r"^{}\d+$", regex_lite::escape(prefix)))
            .map_err(|_| LauncherError::InvalidPrefix(prefix.to_string()))?;
        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    /// The substring marking identifiers as regenerable.
    pub fn stale_pattern(&self) -> &str {
        &self.prefix
    }

    /// Resolve an entry's identifier.
    ///
    /// Uses the explicit `id` field when present, otherwise the last
    /// non-empty segment of the entry's path key.
    pub fn identify(&self, entry: &ConfigEntry) -> Result<String, LauncherError> {
        let id = match &entry.launcher_id {
            Some(id) => id.as_str(),
            None => entry
                .address_key
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .ok_or_else(|| LauncherError::MissingId {
                    entry: entry.address_key.clone(),
                })?,
        };

        if !self.pattern.is_match(id) {
            return Err(LauncherError::InvalidId {
                entry: entry.address_key.clone(),
                id: id.to_string(),
                pattern: self.pattern.as_str().to_string(),
            });
        }
        Ok(id.to_string())
    }
}

/// Launcher entries with their identifiers resolved.
#[derive(Debug, Clone)]
pub struct LauncherBatch {
    pub entries: Vec<ConfigEntry>,

    /// One identifier per entry, in declaration order
    pub ids: Vec<String>,
}

impl LauncherBatch {
    pub fn from_document(document: ConfigDocument, naming: &LauncherNaming) -> Result<Self, LauncherError> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(document.entries.len());

        for entry in &document.entries {
            let id = naming.identify(entry)?;
            if !seen.insert(id.clone()) {
                return Err(LauncherError::DuplicateId(id));
            }
            ids.push(id);
        }

        Ok(Self {
            entries: document.entries,
            ids,
        })
    }
}
