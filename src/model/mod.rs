//! Upstream-resolved build inputs
//!
//! The project descriptor and the resolved dependency set are produced by an
//! external resolver and handed to the assembler read-only, serialized as a
//! single `resolution.json` document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default artifact type when none is recorded
pub const DEFAULT_TYPE: &str = "jar";

/// Dependency scope vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Test,
    Provided,
    System,
}

impl Scope {
    /// Scope name as written in the build descriptor
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::Provided => "provided",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub group_id: String,

    pub artifact_id: String,

    pub version: String,

    /// Packaging type; `jar` when absent
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    /// `None` is the unscoped/default case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,

    #[serde(default)]
    pub optional: bool,

    /// Resolved binary on disk
    pub file: PathBuf,

    /// Declared directly by the project (as opposed to pulled in transitively)
    #[serde(default)]
    pub direct: bool,
}

impl ArtifactRef {
    /// Packaging type with the `jar` default applied
    pub fn type_or_default(&self) -> &str {
        self.artifact_type.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    /// Name the artifact is staged under: `<artifactId>-<version>.<type>`
    pub fn archive_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.artifact_id,
            self.version,
            self.type_or_default()
        )
    }

    /// Identity key used to de-duplicate the resolved set
    pub fn key(&self) -> String {
        let mut key = format!(
            "{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.type_or_default()
        );
        if let Some(classifier) = &self.classifier {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.type_or_default(),
            self.version
        )?;
        if let Some(scope) = self.scope {
            write!(f, ":{}", scope)?;
        }
        Ok(())
    }
}

/// Read-only project metadata snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub group_id: String,

    pub artifact_id: String,

    /// Declared version, possibly `-SNAPSHOT`
    pub version: String,

    /// Resolved (timestamped) version of a snapshot build, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The project's own descriptor file (pom.xml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl ProjectDescriptor {
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }

    /// Maven's default build final name
    pub fn default_final_name(&self) -> String {
        format!("{}-{}", self.artifact_id, self.version)
    }
}

/// Resolver output: project descriptor plus the resolved dependency set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub project: ProjectDescriptor,

    /// Every resolved artifact, direct and transitive, in resolver order
    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,
}

impl Resolution {
    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut resolution: Self = serde_json::from_str(json)?;
        resolution.dedup();
        Ok(resolution)
    }

    /// Load from file, resolving relative artifact paths against the file's directory
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let mut resolution = Self::from_json(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))?;

        if let Some(base) = path.parent() {
            resolution.rebase(base);
        }
        Ok(resolution)
    }

    /// Direct dependencies, in resolver order
    pub fn direct(&self) -> Vec<&ArtifactRef> {
        self.artifacts.iter().filter(|a| a.direct).collect()
    }

    /// Direct and transitive dependencies, in resolver order
    pub fn all(&self) -> Vec<&ArtifactRef> {
        self.artifacts.iter().collect()
    }

    /// Drop repeated identities, keeping the first entry
    ///
    /// An artifact listed as direct anywhere stays direct.
    fn dedup(&mut self) {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<ArtifactRef> = Vec::with_capacity(self.artifacts.len());

        for artifact in self.artifacts.drain(..) {
            match positions.get(&artifact.key()) {
                Some(&index) => kept[index].direct |= artifact.direct,
                None => {
                    positions.insert(artifact.key(), kept.len());
                    kept.push(artifact);
                }
            }
        }

        self.artifacts = kept;
    }

    fn rebase(&mut self, base: &Path) {
        for artifact in &mut self.artifacts {
            if artifact.file.is_relative() {
                artifact.file = base.join(&artifact.file);
            }
        }
        if let Some(file) = &self.project.file {
            if file.is_relative() {
                self.project.file = Some(base.join(file));
            }
        }
    }
}
