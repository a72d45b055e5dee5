//! Typed configuration for one archive build
//!
//! Resolved once from the merged layers; every later stage reads these
//! fields instead of looking values up by key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::effective::ConfigError;
use crate::manifest::Instructions;
use crate::model::ProjectDescriptor;
use crate::selection::{resolve_policy, ContentPolicy};

/// Shape of the merged configuration value
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    include_jar: bool,
    generate_manifest: bool,
    add_descriptor: bool,
    include_empty_dirs: bool,
    force_creation: bool,
    use_transitive_dependencies: bool,
    archive_content: ContentPolicy,
    #[serde(default)]
    instructions: Instructions,
    #[serde(default)]
    final_name: Option<String>,
    output_directory: PathBuf,
    #[serde(default)]
    work_directory: Option<PathBuf>,
    source_directory: PathBuf,
    #[serde(default)]
    manifest_file: Option<PathBuf>,
    #[serde(default)]
    output_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    excludes: Vec<String>,
}

/// Validated configuration for a single build
#[derive(Debug, Clone, Serialize)]
pub struct CbaConfig {
    pub include_jar: bool,
    pub generate_manifest: bool,
    pub add_descriptor: bool,
    pub include_empty_dirs: bool,
    pub force_creation: bool,
    /// Deprecated; folded into `archive_content` by [`CbaConfig::policy`]
    pub use_transitive_dependencies: bool,
    pub archive_content: ContentPolicy,
    pub instructions: Instructions,
    pub final_name: String,
    pub output_directory: PathBuf,
    /// Staging tree root
    pub work_directory: PathBuf,
    /// Auxiliary resources copied path-preserved into the archive
    pub source_directory: PathBuf,
    /// Caller-provided manifest, used when `generate_manifest` is off
    pub manifest_file: Option<PathBuf>,
    /// Fixed timestamp for reproducible archives
    pub output_timestamp: Option<DateTime<Utc>>,
    /// Extra exclude globs for the resource tree
    pub excludes: Vec<String>,
}

impl CbaConfig {
    /// Resolve a merged config value against a project
    pub fn from_value(
        value: Value,
        project: &ProjectDescriptor,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let final_name = raw
            .final_name
            .unwrap_or_else(|| project.default_final_name());
        let output_directory = absolutize(base_dir, &raw.output_directory);
        let work_directory = match raw.work_directory {
            Some(dir) => absolutize(base_dir, &dir),
            None => output_directory.join(&final_name),
        };
        let manifest_file = raw
            .manifest_file
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| absolutize(base_dir, &p));

        let config = Self {
            include_jar: raw.include_jar,
            generate_manifest: raw.generate_manifest,
            add_descriptor: raw.add_descriptor,
            include_empty_dirs: raw.include_empty_dirs,
            force_creation: raw.force_creation,
            use_transitive_dependencies: raw.use_transitive_dependencies,
            archive_content: raw.archive_content,
            instructions: raw.instructions,
            final_name,
            output_directory,
            work_directory,
            source_directory: absolutize(base_dir, &raw.source_directory),
            manifest_file,
            output_timestamp: raw.output_timestamp,
            excludes: raw.excludes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for contradictions
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy()?;

        if self.final_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "final_name must not be empty".to_string(),
            ));
        }
        if self.final_name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "final_name must be a plain file name, got {:?}",
                self.final_name
            )));
        }

        if !self.generate_manifest && self.manifest_file.is_none() {
            return Err(ConfigError::ValidationError(
                "CompositeBundle manifest file location not set; set generate_manifest = true to have it generated"
                    .to_string(),
            ));
        }

        // The staging tree is wiped at the start of every build.
        let protected = [
            Some(("source_directory", &self.source_directory)),
            Some(("output_directory", &self.output_directory)),
            self.manifest_file.as_ref().map(|p| ("manifest_file", p)),
        ];
        for (name, path) in protected.into_iter().flatten() {
            if path.starts_with(&self.work_directory) {
                return Err(ConfigError::ValidationError(format!(
                    "work_directory {} must not contain {} {}",
                    self.work_directory.display(),
                    name,
                    path.display()
                )));
            }
        }

        // Resources are copied into the staging tree.
        if self.work_directory.starts_with(&self.source_directory) {
            return Err(ConfigError::ValidationError(format!(
                "work_directory {} must not be inside source_directory {}",
                self.work_directory.display(),
                self.source_directory.display()
            )));
        }

        self.instructions
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }

    /// Effective content policy, with the deprecated flag folded in
    pub fn policy(&self) -> Result<ContentPolicy, ConfigError> {
        Ok(resolve_policy(
            self.archive_content,
            self.use_transitive_dependencies,
        )?)
    }

    /// Where the primary build output is expected
    pub fn primary_artifact_path(&self) -> PathBuf {
        self.output_directory.join(format!("{}.jar", self.final_name))
    }

    /// Target path of the archive
    pub fn archive_path(&self) -> PathBuf {
        self.output_directory.join(format!("{}.cba", self.final_name))
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
