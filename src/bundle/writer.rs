//! Deterministic zip writer for staging trees

use chrono::{DateTime, Datelike, Timelike, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::listing::{ArchiveListing, EntryType, ListingEntry};
use super::staging::entry_name;
use super::BundleError;

/// Writes a staging tree as a zip archive
///
/// The same tree always produces the same bytes: entries are sorted by
/// name, and every entry carries the same timestamp and normalized
/// permissions.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    include_empty_dirs: bool,
    force: bool,
    timestamp: Option<DateTime<Utc>>,
}

/// Result of writing an archive
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    /// Location of the archive
    pub path: PathBuf,

    /// Entries in the archive
    pub listing: ArchiveListing,

    /// True when an identical archive was already present and left untouched
    pub up_to_date: bool,
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            include_empty_dirs: true,
            force: false,
            timestamp: None,
        }
    }

    /// Keep directories that contain no files
    pub fn with_include_empty_dirs(mut self, include: bool) -> Self {
        self.include_empty_dirs = include;
        self
    }

    /// Rewrite the archive even when it is already up to date
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Timestamp recorded on every entry (1980-01-01 when unset)
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Collect entry names for the tree, directories suffixed with `/`
    fn collect_entries(&self, root: &Path) -> Result<BTreeMap<String, EntryType>, BundleError> {
        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            let rel_path = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| BundleError::PathNotInRoot(entry.path().to_path_buf()))?;

            if rel_path.as_os_str().is_empty() {
                continue;
            }

            let name = entry_name(rel_path);
            if entry.file_type().is_dir() {
                dirs.insert(name);
            } else {
                files.insert(name);
            }
        }

        let mut entries = BTreeMap::new();
        for dir in dirs {
            let prefix = format!("{}/", dir);
            if self.include_empty_dirs || files.iter().any(|f| f.starts_with(&prefix)) {
                entries.insert(prefix, EntryType::Directory);
            }
        }
        for file in files {
            entries.insert(file, EntryType::File);
        }

        Ok(entries)
    }

    /// Build the archive bytes and listing for a tree without touching disk
    pub fn build(&self, root: &Path) -> Result<(Vec<u8>, ArchiveListing), BundleError> {
        let entries = self.collect_entries(root)?;
        let modified = zip_timestamp(self.timestamp);

        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(modified)
            .unix_permissions(0o644);
        let dir_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(modified)
            .unix_permissions(0o755);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut listing_entries = Vec::with_capacity(entries.len());

        for (name, entry_type) in &entries {
            match entry_type {
                EntryType::Directory => {
                    zip.add_directory(name.as_str(), dir_options)?;
                    listing_entries.push(ListingEntry {
                        path: name.clone(),
                        size: 0,
                        sha256: String::new(),
                        entry_type: EntryType::Directory,
                    });
                }
                EntryType::File => {
                    let full_path = root.join(name);
                    let contents = fs::read(&full_path).map_err(BundleError::io(&full_path))?;

                    zip.start_file(name.as_str(), file_options)?;
                    zip.write_all(&contents)
                        .map_err(BundleError::io(&full_path))?;

                    listing_entries.push(ListingEntry {
                        path: name.clone(),
                        size: contents.len() as u64,
                        sha256: sha256_hex(&contents),
                        entry_type: EntryType::File,
                    });
                }
            }
        }

        let bytes = zip.finish()?.into_inner();
        let listing = ArchiveListing {
            archive_sha256: sha256_hex(&bytes),
            entries: listing_entries,
        };

        Ok((bytes, listing))
    }

    /// Write the tree to `dest`
    ///
    /// Unless forced, an existing archive with identical bytes is left in
    /// place. Otherwise the bytes go to `<dest>.tmp` first and are renamed
    /// over the destination.
    pub fn write(&self, root: &Path, dest: &Path) -> Result<ArchiveOutcome, BundleError> {
        let (bytes, listing) = self.build(root)?;

        if !self.force && dest.is_file() {
            let existing = fs::read(dest).map_err(BundleError::io(dest))?;
            if sha256_hex(&existing) == listing.archive_sha256 {
                debug!(archive = %dest.display(), "archive is up to date");
                return Ok(ArchiveOutcome {
                    path: dest.to_path_buf(),
                    listing,
                    up_to_date: true,
                });
            }
        }

        write_atomic(dest, &bytes)?;
        debug!(
            archive = %dest.display(),
            bytes = bytes.len(),
            entries = listing.entries.len(),
            "archive written"
        );

        Ok(ArchiveOutcome {
            path: dest.to_path_buf(),
            listing,
            up_to_date: false,
        })
    }
}

fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), BundleError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(BundleError::io(parent))?;
    }

    let mut tmp_name = dest.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(BundleError::Io { path: tmp, source: e });
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(BundleError::Io {
            path: dest.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

fn zip_timestamp(timestamp: Option<DateTime<Utc>>) -> zip::DateTime {
    let Some(ts) = timestamp else {
        return zip::DateTime::default();
    };
    let Ok(year) = u16::try_from(ts.year()) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        year,
        ts.month() as u8,
        ts.day() as u8,
        ts.hour() as u8,
        ts.minute() as u8,
        ts.second() as u8,
    )
    .unwrap_or_default()
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
