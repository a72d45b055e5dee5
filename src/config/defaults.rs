//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values.

use serde::{Deserialize, Serialize};

use crate::selection::ContentPolicy;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Include the project's own jar (default: true)
    pub include_jar: bool,

    /// Generate COMPOSITEBUNDLE.MF instead of copying one (default: false)
    pub generate_manifest: bool,

    /// Embed pom.xml and pom.properties (default: true)
    pub add_descriptor: bool,

    /// Keep directories with no files in the archive (default: true)
    pub include_empty_dirs: bool,

    /// Rewrite the archive even when it is up to date (default: false)
    pub force_creation: bool,

    /// Deprecated alias for `archive_content = "all"` (default: false)
    pub use_transitive_dependencies: bool,

    /// Which dependency bundles go into the archive (default: "applicationContent")
    pub archive_content: ContentPolicy,

    /// Build output directory (default: "target")
    pub output_directory: String,

    /// Extra resources copied into the archive (default: "src/main/cba")
    pub source_directory: String,

    /// Caller-provided manifest (default: "src/main/cba/META-INF/COMPOSITEBUNDLE.MF")
    pub manifest_file: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            include_jar: true,
            generate_manifest: false,
            add_descriptor: true,
            include_empty_dirs: true,
            force_creation: false,
            use_transitive_dependencies: false,
            archive_content: ContentPolicy::ApplicationContent,
            output_directory: "target".to_string(),
            source_directory: "src/main/cba".to_string(),
            manifest_file: "src/main/cba/META-INF/COMPOSITEBUNDLE.MF".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "include_jar": self.include_jar,
            "generate_manifest": self.generate_manifest,
            "add_descriptor": self.add_descriptor,
            "include_empty_dirs": self.include_empty_dirs,
            "force_creation": self.force_creation,
            "use_transitive_dependencies": self.use_transitive_dependencies,
            "archive_content": self.archive_content.as_str(),
            "instructions": {},
            "output_directory": self.output_directory,
            "source_directory": self.source_directory,
            "manifest_file": self.manifest_file,
            "excludes": []
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert!(defaults.include_jar);
        assert!(!defaults.generate_manifest);
        assert!(defaults.add_descriptor);
        assert!(defaults.include_empty_dirs);
        assert!(!defaults.force_creation);
        assert!(!defaults.use_transitive_dependencies);
        assert_eq!(defaults.archive_content, ContentPolicy::ApplicationContent);
    }

    #[test]
    fn test_to_value() {
        let defaults = BuiltinDefaults::default();
        let value = defaults.to_value();

        assert_eq!(value["archive_content"], "applicationContent");
        assert_eq!(value["output_directory"], "target");
        assert_eq!(value["manifest_file"], "src/main/cba/META-INF/COMPOSITEBUNDLE.MF");
        assert!(value["instructions"].as_object().unwrap().is_empty());
    }
}
