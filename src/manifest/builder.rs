//! Manifest builder
//!
//! A pure function of the project descriptor, the candidate artifacts and
//! the instruction overrides. No filesystem access happens here beyond what
//! the OSGi converter itself does.

use super::*;
use crate::model::{ArtifactRef, ProjectDescriptor};
use crate::osgi::OsgiConverter;
use crate::selection::select_for_manifest;

/// Builds [`ManifestHeaders`] for a composite bundle
pub struct ManifestBuilder<'a> {
    converter: &'a dyn OsgiConverter,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(converter: &'a dyn OsgiConverter) -> Self {
        Self { converter }
    }

    /// Compose the manifest headers.
    ///
    /// `candidates` is the policy-selected candidate set; the builder applies
    /// its own content filter to it.
    pub fn build(
        &self,
        project: &ProjectDescriptor,
        candidates: &[&ArtifactRef],
        instructions: &Instructions,
    ) -> Result<ManifestHeaders, ManifestError> {
        instructions.validate()?;

        let mut headers = ManifestHeaders::new();

        headers.insert(MANIFEST_VERSION, "1");
        headers.insert(COMPOSITE_BUNDLE_MANIFEST_VERSION, "1");
        headers.insert(BUNDLE_SYMBOLIC_NAME, self.symbolic_name(project, instructions));
        headers.insert(BUNDLE_VERSION, self.bundle_version(project, instructions)?);
        headers.insert(BUNDLE_NAME, project.name.clone().unwrap_or_default());
        headers.insert(
            BUNDLE_DESCRIPTION,
            project.description.clone().unwrap_or_default(),
        );
        headers.insert(COMPOSITE_BUNDLE_CONTENT, self.content(candidates)?);

        for header in PASSTHROUGH_HEADERS {
            if let Some(value) = instructions.get(header) {
                headers.insert(*header, value);
            }
        }

        Ok(headers)
    }

    fn symbolic_name(&self, project: &ProjectDescriptor, instructions: &Instructions) -> String {
        match instructions.get(BUNDLE_SYMBOLIC_NAME) {
            Some(name) => name.to_string(),
            None => format!("{}.{}", project.group_id, project.artifact_id),
        }
    }

    fn bundle_version(
        &self,
        project: &ProjectDescriptor,
        instructions: &Instructions,
    ) -> Result<String, ManifestError> {
        if let Some(version) = instructions.get(BUNDLE_VERSION) {
            return Ok(version.to_string());
        }
        self.converter
            .normalize_version(&project.version)
            .map_err(|source| ManifestError::ProjectVersion {
                version: project.version.clone(),
                source,
            })
    }

    fn content(&self, candidates: &[&ArtifactRef]) -> Result<String, ManifestError> {
        let entries = select_for_manifest(candidates)
            .into_iter()
            .map(|artifact| self.content_entry(artifact))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries.join(CONTENT_SEPARATOR))
    }

    fn content_entry(&self, artifact: &ArtifactRef) -> Result<String, ManifestError> {
        let wrap = |source: OsgiError| ManifestError::Artifact {
            artifact: artifact.to_string(),
            source,
        };
        let name = self.converter.bundle_symbolic_name(artifact).map_err(wrap)?;
        let version = self
            .converter
            .normalize_version(&artifact.version)
            .map_err(wrap)?;
        Ok(format!("{};version=\"{}\"", name, version))
    }
}
