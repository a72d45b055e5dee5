//! Staging tree and archive writer
//!
//! Everything that goes into a CBA is first copied into a staging
//! directory. The writer then turns that tree into a deterministic zip
//! archive: entries sorted by path, normalized timestamps and permissions,
//! and published with a write-then-rename so a failed build never leaves a
//! partial archive behind.

mod exclude;
mod listing;
mod staging;
mod writer;

pub use exclude::{ExcludeError, ExcludeRules, DEFAULT_EXCLUDES};
pub use listing::{ArchiveListing, EntryType, ListingEntry};
pub use staging::StagingTree;
pub use writer::{ArchiveOutcome, ArchiveWriter};

use std::io;
use std::path::{Path, PathBuf};

/// Errors for staging and archive operations
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Exclude rules error: {0}")]
    Exclude(#[from] ExcludeError),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Path is not within staging root: {0}")]
    PathNotInRoot(PathBuf),

    #[error("Invalid archive entry path: {0:?}")]
    InvalidEntryPath(String),
}

impl BundleError {
    /// Attach a path to an IO error
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> BundleError + '_ {
        move |source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
