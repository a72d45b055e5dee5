//! Archive assembly
//!
//! A build runs through a fixed sequence of stages. Each stage either
//! completes or aborts the whole build with a [`BuildError`]; nothing is
//! retried and there is no way back to an earlier stage. Contents are
//! staged in the work directory, and the archive only appears at its final
//! path once it has been written completely.

mod error;
mod registry;

pub use error::{BuildError, BuildErrorKind, BuildResult, Stage};
pub use registry::{ArtifactRegistry, ProjectArtifact};

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::bundle::{ArchiveListing, ArchiveWriter, ExcludeRules, StagingTree};
use crate::config::{CbaConfig, ConfigError};
use crate::manifest::{ManifestBuilder, ManifestHeaders, COMPOSITE_BUNDLE_MF_PATH};
use crate::model::Resolution;
use crate::osgi::{DefaultOsgiConverter, OsgiConverter};
use crate::provenance;
use crate::selection::{candidates, select_for_archive, ContentPolicy};

/// Type under which the archive is published
pub const ARCHIVE_TYPE: &str = "cba";

/// Summary of a completed build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Published archive
    pub archive: PathBuf,

    /// The archive already had the same contents and was not rewritten
    pub up_to_date: bool,

    /// Effective content policy
    pub policy: ContentPolicy,

    /// Staged name of the primary artifact, if it was included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    /// Staged dependency entries, in staging order
    pub dependencies: Vec<String>,

    /// Files copied from the resource directory
    pub resources: Vec<String>,

    /// Manifest text, when it was generated by this build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    /// Staged provenance files
    pub provenance: Vec<String>,

    /// Tolerated conditions worth knowing about
    pub warnings: Vec<String>,

    pub listing: ArchiveListing,
}

/// Report fields filled in while staging
#[derive(Debug, Default)]
struct Staged {
    primary: Option<String>,
    dependencies: Vec<String>,
    resources: Vec<String>,
    manifest: Option<String>,
    provenance: Vec<String>,
    warnings: Vec<String>,
}

/// Assembles a composite bundle archive for one project
pub struct Assembler<'a> {
    config: CbaConfig,
    converter: &'a dyn OsgiConverter,
}

impl Assembler<'static> {
    /// Assembler using the default OSGi converter
    pub fn new(config: CbaConfig) -> Self {
        Self {
            config,
            converter: &DefaultOsgiConverter,
        }
    }
}

impl<'a> Assembler<'a> {
    pub fn with_converter(config: CbaConfig, converter: &'a dyn OsgiConverter) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &CbaConfig {
        &self.config
    }

    /// Run every stage and publish the archive
    pub fn build(
        &self,
        resolution: &Resolution,
        registry: &mut dyn ArtifactRegistry,
    ) -> BuildResult<BuildReport> {
        let (policy, rules) = self.check()?;
        let staging = self.init()?;
        let mut staged = Staged::default();

        self.stage_primary(&staging, &mut staged)?;
        self.stage_dependencies(&staging, policy, resolution, &mut staged)?;
        self.stage_resources(&staging, &rules, &mut staged)?;
        self.stage_manifest(&staging, policy, resolution, &mut staged)?;
        self.embed_provenance(&staging, resolution, &mut staged)?;

        info!(stage = %Stage::Materialize, archive = %self.config.archive_path().display(), "writing archive");
        let outcome = ArchiveWriter::new()
            .with_include_empty_dirs(self.config.include_empty_dirs)
            .with_force(self.config.force_creation)
            .with_timestamp(self.config.output_timestamp)
            .write(staging.root(), &self.config.archive_path())
            .map_err(BuildError::at(Stage::Materialize))?;
        if outcome.up_to_date {
            info!(stage = %Stage::Materialize, "archive is up to date, not rewritten");
        }

        info!(stage = %Stage::Publish, archive = %outcome.path.display(), "publishing archive");
        registry.register_primary(&outcome.path, ARCHIVE_TYPE);

        Ok(BuildReport {
            archive: outcome.path,
            up_to_date: outcome.up_to_date,
            policy,
            primary: staged.primary,
            dependencies: staged.dependencies,
            resources: staged.resources,
            manifest: staged.manifest,
            provenance: staged.provenance,
            warnings: staged.warnings,
            listing: outcome.listing,
        })
    }

    /// Compose the manifest headers without touching the filesystem
    pub fn generate_manifest(&self, resolution: &Resolution) -> BuildResult<ManifestHeaders> {
        let policy = self.config.policy().map_err(BuildError::at(Stage::Init))?;
        self.manifest_headers(policy, resolution)
    }

    fn manifest_headers(
        &self,
        policy: ContentPolicy,
        resolution: &Resolution,
    ) -> BuildResult<ManifestHeaders> {
        let candidates = candidates(policy, resolution);
        ManifestBuilder::new(self.converter)
            .build(&resolution.project, &candidates, &self.config.instructions)
            .map_err(BuildError::at(Stage::StageManifest))
    }

    /// Validation that must pass before anything on disk changes
    fn check(&self) -> BuildResult<(ContentPolicy, ExcludeRules)> {
        self.config.validate().map_err(BuildError::at(Stage::Init))?;
        let policy = self.config.policy().map_err(BuildError::at(Stage::Init))?;
        let rules = ExcludeRules::with_patterns(self.config.excludes.as_slice()).map_err(|e| {
            BuildError::new(
                Stage::Init,
                ConfigError::ValidationError(format!("invalid exclude pattern: {}", e)),
            )
        })?;
        Ok((policy, rules))
    }

    fn init(&self) -> BuildResult<StagingTree> {
        info!(
            stage = %Stage::Init,
            work_directory = %self.config.work_directory.display(),
            "preparing staging directory"
        );
        StagingTree::prepare(&self.config.work_directory).map_err(BuildError::at(Stage::Init))
    }

    fn stage_primary(&self, staging: &StagingTree, staged: &mut Staged) -> BuildResult<()> {
        if !self.config.include_jar {
            debug!(stage = %Stage::StagePrimary, "primary artifact not included");
            return Ok(());
        }

        let source = self.config.primary_artifact_path();
        if !source.exists() {
            info!(
                stage = %Stage::StagePrimary,
                path = %source.display(),
                "primary artifact not found, skipping"
            );
            return Ok(());
        }
        if !source.is_file() {
            return Err(BuildError::input(
                Stage::StagePrimary,
                source,
                "not a regular file",
            ));
        }

        let name = format!("{}.jar", self.config.final_name);
        staging
            .stage_file(&source, &name)
            .map_err(BuildError::at(Stage::StagePrimary))?;
        info!(stage = %Stage::StagePrimary, entry = %name, "staged primary artifact");
        staged.primary = Some(name);
        Ok(())
    }

    fn stage_dependencies(
        &self,
        staging: &StagingTree,
        policy: ContentPolicy,
        resolution: &Resolution,
        staged: &mut Staged,
    ) -> BuildResult<()> {
        let candidates = candidates(policy, resolution);
        let selected = select_for_archive(&candidates);
        info!(
            stage = %Stage::StageDependencies,
            policy = %policy,
            candidates = candidates.len(),
            selected = selected.len(),
            "selecting dependencies"
        );

        for artifact in selected {
            if !artifact.file.is_file() {
                return Err(BuildError::input(
                    Stage::StageDependencies,
                    &artifact.file,
                    format!("file of dependency {} is not available", artifact),
                ));
            }

            let name = artifact.archive_name();
            let replaces = staged.dependencies.contains(&name);
            if replaces {
                let message = format!("{} replaces an earlier dependency entry {}", artifact, name);
                warn!(stage = %Stage::StageDependencies, "{}", message);
                staged.warnings.push(message);
            }

            staging
                .stage_file(&artifact.file, &name)
                .map_err(BuildError::at(Stage::StageDependencies))?;
            debug!(stage = %Stage::StageDependencies, artifact = %artifact, entry = %name, "staged dependency");
            // The entry keeps its first position in the report.
            if !replaces {
                staged.dependencies.push(name);
            }
        }
        Ok(())
    }

    fn stage_resources(
        &self,
        staging: &StagingTree,
        rules: &ExcludeRules,
        staged: &mut Staged,
    ) -> BuildResult<()> {
        let source = &self.config.source_directory;
        if !source.exists() {
            debug!(
                stage = %Stage::StageResources,
                path = %source.display(),
                "no resource directory"
            );
            return Ok(());
        }
        if !source.is_dir() {
            return Err(BuildError::input(
                Stage::StageResources,
                source,
                "not a directory",
            ));
        }

        staged.resources = staging
            .stage_tree(source, rules)
            .map_err(BuildError::at(Stage::StageResources))?;
        info!(
            stage = %Stage::StageResources,
            files = staged.resources.len(),
            "staged resources"
        );
        Ok(())
    }

    fn stage_manifest(
        &self,
        staging: &StagingTree,
        policy: ContentPolicy,
        resolution: &Resolution,
        staged: &mut Staged,
    ) -> BuildResult<()> {
        if self.config.generate_manifest {
            staging
                .remove(COMPOSITE_BUNDLE_MF_PATH)
                .map_err(BuildError::at(Stage::StageManifest))?;

            let text = self.manifest_headers(policy, resolution)?.to_text();
            staging
                .stage_bytes(COMPOSITE_BUNDLE_MF_PATH, text.as_bytes())
                .map_err(BuildError::at(Stage::StageManifest))?;
            info!(stage = %Stage::StageManifest, "generated manifest");
            staged.manifest = Some(text);
        } else {
            let source = self.config.manifest_file.as_ref().ok_or_else(|| {
                BuildError::new(
                    Stage::StageManifest,
                    ConfigError::ValidationError(
                        "CompositeBundle manifest file location not set".to_string(),
                    ),
                )
            })?;

            if source.is_file() {
                staging
                    .stage_file(source, COMPOSITE_BUNDLE_MF_PATH)
                    .map_err(BuildError::at(Stage::StageManifest))?;
                info!(stage = %Stage::StageManifest, path = %source.display(), "copied manifest");
            } else if source.exists() {
                return Err(BuildError::input(
                    Stage::StageManifest,
                    source,
                    "not a regular file",
                ));
            } else {
                info!(
                    stage = %Stage::StageManifest,
                    path = %source.display(),
                    "manifest file not found"
                );
            }
        }

        if !staging.contains(COMPOSITE_BUNDLE_MF_PATH) {
            let message = format!("{} is missing from the archive", COMPOSITE_BUNDLE_MF_PATH);
            warn!(stage = %Stage::StageManifest, "{}", message);
            staged.warnings.push(message);
        }
        Ok(())
    }

    fn embed_provenance(
        &self,
        staging: &StagingTree,
        resolution: &Resolution,
        staged: &mut Staged,
    ) -> BuildResult<()> {
        if !self.config.add_descriptor {
            return Ok(());
        }

        staged.provenance = provenance::embed(
            staging,
            &resolution.project,
            self.config.output_timestamp,
        )
        .map_err(BuildError::at(Stage::EmbedProvenance))?;
        debug!(
            stage = %Stage::EmbedProvenance,
            dir = %provenance::descriptor_dir(&resolution.project),
            "embedded provenance"
        );
        Ok(())
    }
}
