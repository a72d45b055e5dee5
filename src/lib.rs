//! Composite Bundle Archive assembler
//!
//! Packages a project's primary jar, its selected dependency bundles, an
//! auxiliary resource tree and a composite bundle manifest into a single
//! zip-format `.cba` archive.

pub mod assembler;
pub mod bundle;
pub mod config;
pub mod manifest;
pub mod model;
pub mod osgi;
pub mod provenance;
pub mod selection;

pub use assembler::{
    ArtifactRegistry, Assembler, BuildError, BuildErrorKind, BuildReport, BuildResult,
    ProjectArtifact, Stage,
};
pub use config::{CbaConfig, ConfigError, EffectiveConfig};
pub use manifest::{Instructions, ManifestBuilder, ManifestError, ManifestHeaders};
pub use model::{ArtifactRef, ProjectDescriptor, Resolution, Scope};
pub use osgi::{CoordinateOsgiConverter, DefaultOsgiConverter, OsgiConverter};
pub use selection::{ContentPolicy, PolicyConflict};
