//! Artifact selection
//!
//! Decides which resolved dependencies belong in the archive:
//! 1. The content policy picks the candidate set (none, direct, or all)
//! 2. The archive filter keeps non-optional, runtime-reachable artifacts
//! 3. The manifest filter keeps non-optional compile/runtime/unscoped artifacts
//!
//! Candidate order is the resolver's order; nothing is sorted here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{ArtifactRef, Resolution, Scope};

/// Which dependency bundles go into the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentPolicy {
    /// No dependency bundles
    None,
    /// Direct dependencies only
    #[default]
    ApplicationContent,
    /// Direct and transitive dependencies
    All,
}

impl ContentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentPolicy::None => "none",
            ContentPolicy::ApplicationContent => "applicationContent",
            ContentPolicy::All => "all",
        }
    }
}

impl fmt::Display for ContentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ContentPolicy::None),
            "applicationContent" => Ok(ContentPolicy::ApplicationContent),
            "all" => Ok(ContentPolicy::All),
            other => Err(format!(
                "unknown archive content '{}'. Valid: none, applicationContent, all",
                other
            )),
        }
    }
}

/// The deprecated transitive flag contradicts `archive_content = none`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "use_transitive_dependencies and archive_content incompatibly configured; \
     use_transitive_dependencies is deprecated in favor of archive_content"
)]
pub struct PolicyConflict;

/// Fold the deprecated `use_transitive_dependencies` flag into a policy.
pub fn resolve_policy(
    archive_content: ContentPolicy,
    use_transitive_dependencies: bool,
) -> Result<ContentPolicy, PolicyConflict> {
    match (use_transitive_dependencies, archive_content) {
        (true, ContentPolicy::None) => Err(PolicyConflict),
        (true, _) => Ok(ContentPolicy::All),
        (false, policy) => Ok(policy),
    }
}

/// Candidate artifacts for a policy, in resolver order
pub fn candidates(policy: ContentPolicy, resolution: &Resolution) -> Vec<&ArtifactRef> {
    match policy {
        ContentPolicy::None => Vec::new(),
        ContentPolicy::ApplicationContent => resolution.direct(),
        ContentPolicy::All => resolution.all(),
    }
}

/// Scopes visible on the runtime classpath.
///
/// Unscoped artifacts count as runtime-reachable.
pub fn is_runtime_reachable(scope: Option<Scope>) -> bool {
    match scope {
        None | Some(Scope::Compile) | Some(Scope::Runtime) => true,
        Some(Scope::Test) | Some(Scope::Provided) | Some(Scope::System) => false,
    }
}

/// Artifacts to copy into the archive body
pub fn select_for_archive<'a>(candidates: &[&'a ArtifactRef]) -> Vec<&'a ArtifactRef> {
    candidates
        .iter()
        .copied()
        .filter(|a| !a.optional && is_runtime_reachable(a.scope))
        .collect()
}

/// Artifacts listed in `CompositeBundle-Content`
pub fn select_for_manifest<'a>(candidates: &[&'a ArtifactRef]) -> Vec<&'a ArtifactRef> {
    candidates
        .iter()
        .copied()
        .filter(|a| {
            !a.optional
                && matches!(a.scope, None | Some(Scope::Compile) | Some(Scope::Runtime))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectDescriptor;
    use std::path::PathBuf;

    fn artifact(id: &str, scope: Option<Scope>, optional: bool, direct: bool) -> ArtifactRef {
        ArtifactRef {
            group_id: "org.example".to_string(),
            artifact_id: id.to_string(),
            version: "1.0".to_string(),
            artifact_type: None,
            classifier: None,
            scope,
            optional,
            file: PathBuf::from(format!("/repo/{}.jar", id)),
            direct,
        }
    }

    fn resolution() -> Resolution {
        Resolution {
            project: ProjectDescriptor {
                group_id: "org.example".to_string(),
                artifact_id: "app".to_string(),
                version: "1.0".to_string(),
                artifact_version: None,
                name: None,
                description: None,
                file: None,
            },
            artifacts: vec![
                artifact("direct-runtime", Some(Scope::Runtime), false, true),
                artifact("transitive-compile", Some(Scope::Compile), false, false),
                artifact("direct-test", Some(Scope::Test), false, true),
                artifact("direct-optional", None, true, true),
                artifact("direct-unscoped", None, false, true),
                artifact("transitive-provided", Some(Scope::Provided), false, false),
            ],
        }
    }

    fn ids(artifacts: &[&ArtifactRef]) -> Vec<String> {
        artifacts.iter().map(|a| a.artifact_id.clone()).collect()
    }

    #[test]
    fn test_resolve_policy() {
        assert_eq!(
            resolve_policy(ContentPolicy::ApplicationContent, false),
            Ok(ContentPolicy::ApplicationContent)
        );
        assert_eq!(
            resolve_policy(ContentPolicy::ApplicationContent, true),
            Ok(ContentPolicy::All)
        );
        assert_eq!(resolve_policy(ContentPolicy::All, true), Ok(ContentPolicy::All));
        assert_eq!(resolve_policy(ContentPolicy::None, false), Ok(ContentPolicy::None));
        assert_eq!(resolve_policy(ContentPolicy::None, true), Err(PolicyConflict));
    }

    #[test]
    fn test_candidates_by_policy() {
        let resolution = resolution();

        assert!(candidates(ContentPolicy::None, &resolution).is_empty());
        assert_eq!(
            ids(&candidates(ContentPolicy::ApplicationContent, &resolution)),
            vec!["direct-runtime", "direct-test", "direct-optional", "direct-unscoped"]
        );
        assert_eq!(candidates(ContentPolicy::All, &resolution).len(), 6);
    }

    #[test]
    fn test_archive_selection_filters_scope_and_optional() {
        let resolution = resolution();
        let all = candidates(ContentPolicy::All, &resolution);

        assert_eq!(
            ids(&select_for_archive(&all)),
            vec!["direct-runtime", "transitive-compile", "direct-unscoped"]
        );
    }

    #[test]
    fn test_manifest_selection_is_subset_of_archive_selection() {
        let resolution = resolution();
        for policy in [
            ContentPolicy::None,
            ContentPolicy::ApplicationContent,
            ContentPolicy::All,
        ] {
            let candidates = candidates(policy, &resolution);
            let archive = select_for_archive(&candidates);
            for artifact in select_for_manifest(&candidates) {
                assert!(archive.contains(&artifact), "{} not in archive", artifact);
            }
        }
    }

    #[test]
    fn test_runtime_reachable_scopes() {
        assert!(is_runtime_reachable(None));
        assert!(is_runtime_reachable(Some(Scope::Compile)));
        assert!(is_runtime_reachable(Some(Scope::Runtime)));
        assert!(!is_runtime_reachable(Some(Scope::Test)));
        assert!(!is_runtime_reachable(Some(Scope::Provided)));
        assert!(!is_runtime_reachable(Some(Scope::System)));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("all".parse::<ContentPolicy>(), Ok(ContentPolicy::All));
        assert!("everything".parse::<ContentPolicy>().is_err());
    }
}
