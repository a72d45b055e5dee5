//! Property-based tests for artifact selection and manifest content
//!
//! These tests verify invariants that must hold for any resolved
//! artifact set:
//! - optional artifacts are never packaged or listed
//! - the deprecated transitive flag always conflicts with `none`
//! - everything listed in the manifest is also packaged
//! - manifest text is a pure function of its inputs

use cba_assembler::selection::{
    candidates, resolve_policy, select_for_archive, select_for_manifest,
};
use cba_assembler::{
    ArtifactRef, ContentPolicy, CoordinateOsgiConverter, Instructions, ManifestBuilder,
    ProjectDescriptor, Resolution, Scope,
};
use proptest::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Strategies
// ============================================================================

fn arb_policy() -> impl Strategy<Value = ContentPolicy> {
    prop_oneof![
        Just(ContentPolicy::None),
        Just(ContentPolicy::ApplicationContent),
        Just(ContentPolicy::All),
    ]
}

fn arb_scope() -> impl Strategy<Value = Option<Scope>> {
    prop_oneof![
        Just(None),
        Just(Some(Scope::Compile)),
        Just(Some(Scope::Runtime)),
        Just(Some(Scope::Test)),
        Just(Some(Scope::Provided)),
        Just(Some(Scope::System)),
    ]
}

fn arb_artifact() -> impl Strategy<Value = ArtifactRef> {
    (
        prop::string::string_regex("[a-z][a-z0-9-]{0,11}").unwrap(),
        (1u32..10, 0u32..10),
        arb_scope(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(artifact_id, (major, minor), scope, optional, direct)| {
            let version = format!("{}.{}", major, minor);
            ArtifactRef {
                group_id: "org.example".to_string(),
                file: PathBuf::from(format!("/repo/{}-{}.jar", artifact_id, version)),
                artifact_id,
                version,
                artifact_type: None,
                classifier: None,
                scope,
                optional,
                direct,
            }
        })
}

fn arb_resolution() -> impl Strategy<Value = Resolution> {
    prop::collection::vec(arb_artifact(), 0..12).prop_map(|artifacts| Resolution {
        project: ProjectDescriptor {
            group_id: "org.example".to_string(),
            artifact_id: "composite".to_string(),
            version: "2.1".to_string(),
            artifact_version: None,
            name: Some("Composite".to_string()),
            description: None,
            file: None,
        },
        artifacts,
    })
}

fn keys(artifacts: &[&ArtifactRef]) -> Vec<String> {
    artifacts.iter().map(|a| a.key()).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn optional_artifacts_never_selected(resolution in arb_resolution(), policy in arb_policy()) {
        let candidates = candidates(policy, &resolution);

        prop_assert!(select_for_archive(&candidates).iter().all(|a| !a.optional));
        prop_assert!(select_for_manifest(&candidates).iter().all(|a| !a.optional));
    }

    #[test]
    fn none_with_transitive_always_conflicts(_resolution in arb_resolution()) {
        prop_assert!(resolve_policy(ContentPolicy::None, true).is_err());
    }

    #[test]
    fn transitive_flag_widens_to_all(policy in arb_policy()) {
        let resolved = resolve_policy(policy, true);
        match policy {
            ContentPolicy::None => prop_assert!(resolved.is_err()),
            _ => prop_assert_eq!(resolved.unwrap(), ContentPolicy::All),
        }
        prop_assert_eq!(resolve_policy(policy, false).unwrap(), policy);
    }

    #[test]
    fn manifest_content_is_subset_of_archive(resolution in arb_resolution(), policy in arb_policy()) {
        let candidates = candidates(policy, &resolution);
        let packaged = keys(&select_for_archive(&candidates));

        for key in keys(&select_for_manifest(&candidates)) {
            prop_assert!(packaged.contains(&key), "{} listed but not packaged", key);
        }
    }

    #[test]
    fn none_policy_selects_nothing(resolution in arb_resolution()) {
        prop_assert!(candidates(ContentPolicy::None, &resolution).is_empty());
    }

    #[test]
    fn test_scope_never_selected(resolution in arb_resolution(), policy in arb_policy()) {
        let candidates = candidates(policy, &resolution);

        prop_assert!(select_for_archive(&candidates)
            .iter()
            .all(|a| a.scope != Some(Scope::Test)));
        prop_assert!(select_for_manifest(&candidates)
            .iter()
            .all(|a| a.scope != Some(Scope::Test)));
    }

    #[test]
    fn manifest_text_is_deterministic(resolution in arb_resolution(), policy in arb_policy()) {
        let converter = CoordinateOsgiConverter;
        let builder = ManifestBuilder::new(&converter);
        let candidates = candidates(policy, &resolution);
        let instructions: Instructions = [
            ("CompositeBundle-ExportService", "test.ExportService"),
            ("CompositeBundle-ImportService", "test.ImportService"),
        ]
        .into_iter()
        .collect();

        let first = builder.build(&resolution.project, &candidates, &instructions).unwrap();
        let second = builder.build(&resolution.project, &candidates, &instructions).unwrap();

        prop_assert_eq!(first.to_text(), second.to_text());
        prop_assert_eq!(
            first.keys()[..7].to_vec(),
            vec![
                "Manifest-Version",
                "CompositeBundle-ManifestVersion",
                "Bundle-SymbolicName",
                "Bundle-Version",
                "Bundle-Name",
                "Bundle-Description",
                "CompositeBundle-Content",
            ]
        );
    }
}
