//! Staging directory for archive contents
//!
//! Paths inside the staging tree are always given as `/`-separated
//! relative names, matching the entry names they become in the archive.

use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::exclude::ExcludeRules;
use super::BundleError;

/// A directory that mirrors the future archive layout
#[derive(Debug, Clone)]
pub struct StagingTree {
    root: PathBuf,
}

impl StagingTree {
    /// Create an empty staging tree, removing anything left from a previous build
    pub fn prepare(root: &Path) -> Result<Self, BundleError> {
        if root.exists() {
            fs::remove_dir_all(root).map_err(BundleError::io(root))?;
        }
        fs::create_dir_all(root).map_err(BundleError::io(root))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Staging root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative entry name
    pub fn path(&self, rel: &str) -> Result<PathBuf, BundleError> {
        let rel_path = Path::new(rel);
        let well_formed = !rel.is_empty()
            && rel_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(BundleError::InvalidEntryPath(rel.to_string()));
        }
        Ok(self.root.join(rel_path))
    }

    /// Whether a file is staged under the given name
    pub fn contains(&self, rel: &str) -> bool {
        self.path(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Remove a staged file, returning whether it was present
    pub fn remove(&self, rel: &str) -> Result<bool, BundleError> {
        let path = self.path(rel)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(BundleError::io(&path))?;
        Ok(true)
    }

    /// Copy a file into the tree, returning the number of bytes copied
    pub fn stage_file(&self, source: &Path, rel: &str) -> Result<u64, BundleError> {
        let dest = self.path(rel)?;
        ensure_parent(&dest)?;
        fs::copy(source, &dest).map_err(BundleError::io(source))
    }

    /// Write bytes into the tree
    pub fn stage_bytes(&self, rel: &str, bytes: &[u8]) -> Result<(), BundleError> {
        let dest = self.path(rel)?;
        ensure_parent(&dest)?;
        fs::write(&dest, bytes).map_err(BundleError::io(&dest))
    }

    /// Recursively copy a directory into the tree root
    ///
    /// Excluded paths are pruned, including everything below an excluded
    /// directory. Directories are created even when empty. Returns the
    /// staged file names in walk order.
    pub fn stage_tree(
        &self,
        source: &Path,
        rules: &ExcludeRules,
    ) -> Result<Vec<String>, BundleError> {
        let mut staged = Vec::new();

        let walker = WalkDir::new(source)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| {
                let rel = e.path().strip_prefix(source).unwrap_or(e.path());
                rel.as_os_str().is_empty() || !rules.is_excluded(rel)
            });

        for entry in walker {
            let entry = entry?;
            let rel_path = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| BundleError::PathNotInRoot(entry.path().to_path_buf()))?;

            if rel_path.as_os_str().is_empty() {
                continue;
            }

            let rel = entry_name(rel_path);
            let dest = self.path(&rel)?;

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(BundleError::io(&dest))?;
            } else {
                ensure_parent(&dest)?;
                fs::copy(entry.path(), &dest).map_err(BundleError::io(entry.path()))?;
                staged.push(rel);
            }
        }

        Ok(staged)
    }
}

/// `/`-separated name of a relative path
pub(crate) fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn ensure_parent(path: &Path) -> Result<(), BundleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(BundleError::io(parent))?;
    }
    Ok(())
}
