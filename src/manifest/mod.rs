//! Composite bundle manifest
//!
//! `META-INF/COMPOSITEBUNDLE.MF` describes the composite's identity, the
//! bundles it contains and its service import/export contract. Headers are
//! built in memory as an ordered map and serialized once.

mod builder;

pub use builder::ManifestBuilder;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

use cba_osgi::OsgiError;

/// In-archive path of the composite bundle manifest
pub const COMPOSITE_BUNDLE_MF_PATH: &str = "META-INF/COMPOSITEBUNDLE.MF";

pub const MANIFEST_VERSION: &str = "Manifest-Version";
pub const COMPOSITE_BUNDLE_MANIFEST_VERSION: &str = "CompositeBundle-ManifestVersion";
pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const BUNDLE_NAME: &str = "Bundle-Name";
pub const BUNDLE_DESCRIPTION: &str = "Bundle-Description";
pub const COMPOSITE_BUNDLE_CONTENT: &str = "CompositeBundle-Content";
pub const COMPOSITE_BUNDLE_EXPORT_SERVICE: &str = "CompositeBundle-ExportService";
pub const COMPOSITE_BUNDLE_IMPORT_SERVICE: &str = "CompositeBundle-ImportService";
pub const EXPORT_PACKAGE: &str = "Export-Package";
pub const IMPORT_PACKAGE: &str = "Import-Package";

/// Headers copied verbatim from instructions, in emission order
pub const PASSTHROUGH_HEADERS: &[&str] = &[
    COMPOSITE_BUNDLE_EXPORT_SERVICE,
    COMPOSITE_BUNDLE_IMPORT_SERVICE,
    EXPORT_PACKAGE,
    IMPORT_PACKAGE,
];

/// Separator between `CompositeBundle-Content` entries (manifest continuation line)
pub const CONTENT_SEPARATOR: &str = ",\n ";

/// Errors while composing the manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot convert project version {version:?}: {source}")]
    ProjectVersion {
        version: String,
        #[source]
        source: OsgiError,
    },

    #[error("cannot convert {artifact} to an OSGi bundle: {source}")]
    Artifact {
        artifact: String,
        #[source]
        source: OsgiError,
    },

    #[error("instruction {key:?} {reason}")]
    Instruction { key: String, reason: &'static str },
}

/// Ordered header map; insertion order is emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestHeaders {
    entries: Vec<(String, String)>,
}

impl ManifestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header. An existing key keeps its position and gets the new
    /// value, which returns the old one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Manifest text: one `Key: Value` line per header
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.entries {
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
            text.push('\n');
        }
        text
    }

    /// Write the manifest text to a file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_text())
    }
}

impl Serialize for ManifestHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Caller-supplied header overrides, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructions(Vec<(String, String)>);

impl Instructions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an instruction; a repeated key replaces the earlier value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every instruction can be written as a single header line
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (key, value) in self.iter() {
            let reason = if key.is_empty() {
                Some("has an empty header name")
            } else if !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                Some("is not a valid header name")
            } else if value.chars().any(char::is_control) {
                Some("value contains a control character")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ManifestError::Instruction {
                    key: key.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Instructions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut instructions = Self::new();
        for (key, value) in iter {
            instructions.set(key, value);
        }
        instructions
    }
}

impl<'de> Deserialize<'de> for Instructions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect())
    }
}

impl Serialize for Instructions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
