//! Listing of the entries written into an archive

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Entry type in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

/// A single archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Entry name inside the archive (directories end with `/`)
    pub path: String,

    /// Uncompressed size in bytes (0 for directories)
    pub size: u64,

    /// SHA-256 of file contents (empty for directories)
    pub sha256: String,

    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// All entries of one archive, in archive order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveListing {
    /// SHA-256 of the archive bytes
    pub archive_sha256: String,

    pub entries: Vec<ListingEntry>,
}

impl ArchiveListing {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }

    /// Entry names in archive order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    /// Total uncompressed size of all files
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Count of (files, directories)
    pub fn entry_counts(&self) -> (usize, usize) {
        let files = self
            .entries
            .iter()
            .filter(|e| e.entry_type == EntryType::File)
            .count();
        (files, self.entries.len() - files)
    }

    /// Find an entry by name
    pub fn find_entry(&self, path: &str) -> Option<&ListingEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}
