//! Build errors
//!
//! Every failure is reported once, tagged with the stage it happened in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::bundle::BundleError;
use crate::config::ConfigError;
use crate::manifest::ManifestError;
use crate::provenance::ProvenanceError;

/// Assembly stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    StagePrimary,
    StageDependencies,
    StageResources,
    StageManifest,
    EmbedProvenance,
    Materialize,
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::StagePrimary => "stage primary artifact",
            Stage::StageDependencies => "stage dependencies",
            Stage::StageResources => "stage resources",
            Stage::StageManifest => "stage manifest",
            Stage::EmbedProvenance => "embed provenance",
            Stage::Materialize => "materialize",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong
#[derive(Debug, thiserror::Error)]
pub enum BuildErrorKind {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("unusable input {path}: {reason}")]
    ResolutionInput { path: PathBuf, reason: String },

    #[error("manifest generation failed: {0}")]
    ManifestGeneration(#[from] ManifestError),

    #[error("archive write failed: {0}")]
    ArchiveWrite(#[from] BundleError),
}

impl From<ProvenanceError> for BuildErrorKind {
    fn from(err: ProvenanceError) -> Self {
        match err {
            ProvenanceError::MissingDescriptor(coordinates) => BuildErrorKind::ResolutionInput {
                path: PathBuf::new(),
                reason: format!("project {} has no descriptor file", coordinates),
            },
            ProvenanceError::DescriptorNotFound(path) => BuildErrorKind::ResolutionInput {
                path,
                reason: "project descriptor not found".to_string(),
            },
            ProvenanceError::Bundle(e) => BuildErrorKind::ArchiveWrite(e),
        }
    }
}

/// A terminal build failure
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {kind}")]
pub struct BuildError {
    pub stage: Stage,

    #[source]
    pub kind: BuildErrorKind,
}

impl BuildError {
    pub fn new(stage: Stage, kind: impl Into<BuildErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    /// Error mapper for a stage, for use with `map_err`
    pub fn at<E: Into<BuildErrorKind>>(stage: Stage) -> impl FnOnce(E) -> BuildError {
        move |e| BuildError::new(stage, e)
    }

    pub(crate) fn input(stage: Stage, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(
            stage,
            BuildErrorKind::ResolutionInput {
                path: path.into(),
                reason: reason.into(),
            },
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            BuildErrorKind::Configuration(_) => 1,
            BuildErrorKind::ResolutionInput { .. } => 2,
            BuildErrorKind::ManifestGeneration(_) => 3,
            BuildErrorKind::ArchiveWrite(_) => 4,
        }
    }
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
