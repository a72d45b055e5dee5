//! OSGi naming collaborator
//!
//! The manifest builder only sees this trait; the default implementation
//! delegates to the `cba-osgi` crate.

use cba_osgi::OsgiError;

use crate::model::ArtifactRef;

/// Converts Maven coordinates into OSGi bundle names and versions
pub trait OsgiConverter {
    /// Normalize a raw version into OSGi `major.minor.micro.qualifier` form
    fn normalize_version(&self, raw: &str) -> Result<String, OsgiError>;

    /// Bundle symbolic name of a dependency artifact
    fn bundle_symbolic_name(&self, artifact: &ArtifactRef) -> Result<String, OsgiError>;
}

/// Converter that inspects the artifact's jar manifest before falling back
/// to coordinate rules
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOsgiConverter;

impl OsgiConverter for DefaultOsgiConverter {
    fn normalize_version(&self, raw: &str) -> Result<String, OsgiError> {
        cba_osgi::cleanup_version(raw)
    }

    fn bundle_symbolic_name(&self, artifact: &ArtifactRef) -> Result<String, OsgiError> {
        cba_osgi::symbolic_name(
            &artifact.group_id,
            &artifact.artifact_id,
            Some(artifact.file.as_path()),
        )
    }
}

/// Converter that never touches the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateOsgiConverter;

impl OsgiConverter for CoordinateOsgiConverter {
    fn normalize_version(&self, raw: &str) -> Result<String, OsgiError> {
        cba_osgi::cleanup_version(raw)
    }

    fn bundle_symbolic_name(&self, artifact: &ArtifactRef) -> Result<String, OsgiError> {
        cba_osgi::symbolic_name_from_coordinates(&artifact.group_id, &artifact.artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn artifact() -> ArtifactRef {
        ArtifactRef {
            group_id: "org.example".to_string(),
            artifact_id: "example-core".to_string(),
            version: "1.0-SNAPSHOT".to_string(),
            artifact_type: None,
            classifier: None,
            scope: None,
            optional: false,
            file: PathBuf::from("/nonexistent/example-core.jar"),
            direct: true,
        }
    }

    #[test]
    fn test_default_converter_falls_back_to_coordinates() {
        let converter = DefaultOsgiConverter;
        assert_eq!(
            converter.bundle_symbolic_name(&artifact()).unwrap(),
            "org.example.core"
        );
        assert_eq!(
            converter.normalize_version("1.0-SNAPSHOT").unwrap(),
            "1.0.0.SNAPSHOT"
        );
    }

    #[test]
    fn test_coordinate_converter() {
        let converter = CoordinateOsgiConverter;
        assert_eq!(
            converter.bundle_symbolic_name(&artifact()).unwrap(),
            "org.example.core"
        );
    }
}
