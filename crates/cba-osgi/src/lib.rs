//! Maven-to-OSGi coordinate conversion.
//!
//! Two pure conversions used when describing Maven artifacts as OSGi bundles:
//! cleaning a Maven version string up into OSGi's
//! `major.minor.micro.qualifier` form, and deriving a bundle symbolic name
//! from an artifact's coordinates (or from the jar's own manifest when it
//! already declares one).

mod symbolic;
mod version;

pub use symbolic::{symbolic_name, symbolic_name_from_coordinates};
pub use version::{cleanup_version, is_osgi_version};

use std::path::PathBuf;

/// Errors raised while converting Maven coordinates.
#[derive(Debug, thiserror::Error)]
pub enum OsgiError {
    #[error("malformed version {raw:?}: {reason}")]
    MalformedVersion { raw: String, reason: &'static str },

    #[error("empty {0}")]
    EmptyIdentifier(&'static str),

    #[error("cannot read jar {path}: {source}")]
    Jar {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
