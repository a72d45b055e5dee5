//! Build provenance embedded in the archive
//!
//! Mirrors Maven's layout: the project descriptor and a small properties
//! file with the build coordinates under
//! `META-INF/maven/<groupId>/<artifactId>/`.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::bundle::{BundleError, StagingTree};
use crate::model::ProjectDescriptor;

/// Root of the provenance tree inside the archive
pub const MAVEN_DESCRIPTOR_DIR: &str = "META-INF/maven";

/// First line of every generated properties file
pub const PROPERTIES_HEADER: &str = "#Generated by cba-assembler";

/// Errors from embedding provenance
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    #[error("project {0} has no descriptor file")]
    MissingDescriptor(String),

    #[error("project descriptor not found: {0}")]
    DescriptorNotFound(PathBuf),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// Archive directory holding the provenance files of a project
pub fn descriptor_dir(project: &ProjectDescriptor) -> String {
    format!(
        "{}/{}/{}",
        MAVEN_DESCRIPTOR_DIR, project.group_id, project.artifact_id
    )
}

/// Render `pom.properties`
///
/// The date comment is only written for builds with a fixed output
/// timestamp so that default builds stay reproducible.
pub fn pom_properties(project: &ProjectDescriptor, timestamp: Option<DateTime<Utc>>) -> String {
    let version = match (&project.artifact_version, project.is_snapshot()) {
        (Some(resolved), true) => resolved.as_str(),
        _ => project.version.as_str(),
    };

    let mut out = String::new();
    out.push_str(PROPERTIES_HEADER);
    out.push('\n');
    if let Some(ts) = timestamp {
        out.push_str(&format!("#{}\n", ts.format("%a %b %d %H:%M:%S UTC %Y")));
    }
    out.push_str(&format!("artifactId={}\n", project.artifact_id));
    out.push_str(&format!("groupId={}\n", project.group_id));
    out.push_str(&format!("version={}\n", version));
    out
}

/// Stage `pom.xml` and `pom.properties`, returning the staged names
pub fn embed(
    staging: &StagingTree,
    project: &ProjectDescriptor,
    timestamp: Option<DateTime<Utc>>,
) -> Result<Vec<String>, ProvenanceError> {
    let coordinates = format!("{}:{}", project.group_id, project.artifact_id);
    let descriptor = project
        .file
        .as_ref()
        .ok_or(ProvenanceError::MissingDescriptor(coordinates))?;
    if !descriptor.is_file() {
        return Err(ProvenanceError::DescriptorNotFound(descriptor.clone()));
    }

    let dir = descriptor_dir(project);
    let pom_xml = format!("{}/pom.xml", dir);
    let pom_props = format!("{}/pom.properties", dir);

    staging.stage_file(descriptor, &pom_xml)?;
    staging.stage_bytes(&pom_props, pom_properties(project, timestamp).as_bytes())?;

    Ok(vec![pom_xml, pom_props])
}
