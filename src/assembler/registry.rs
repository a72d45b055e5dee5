//! Publication of the produced archive

use std::path::{Path, PathBuf};

/// Receives the build's primary output
pub trait ArtifactRegistry {
    fn register_primary(&mut self, file: &Path, artifact_type: &str);
}

/// In-memory record of the project's primary artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectArtifact {
    pub file: Option<PathBuf>,
    pub artifact_type: Option<String>,
}

impl ProjectArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.file.is_some()
    }
}

impl ArtifactRegistry for ProjectArtifact {
    fn register_primary(&mut self, file: &Path, artifact_type: &str) {
        self.file = Some(file.to_path_buf());
        self.artifact_type = Some(artifact_type.to_string());
    }
}
