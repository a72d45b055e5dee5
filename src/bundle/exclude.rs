//! Exclusion rules for the auxiliary resource tree
//!
//! Version-control metadata and editor droppings never end up in an archive.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Default patterns to exclude when copying resources
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Editors
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // SCCS / Visual SourceSafe
    "**/SCCS",
    "**/SCCS/**",
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Git
    "**/.git",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitattributes",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    // Bazaar
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
    // Mac
    "**/.DS_Store",
];

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Exclusion rules for filtering files
#[derive(Debug)]
pub struct ExcludeRules {
    glob_set: GlobSet,
}

impl ExcludeRules {
    /// Create new exclusion rules with defaults
    pub fn new() -> Result<Self, ExcludeError> {
        Self::with_patterns::<&str>(&[])
    }

    /// Default rules plus additional patterns
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();

        for pattern in DEFAULT_EXCLUDES {
            builder.add(Glob::new(pattern)?);
        }

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    /// Check if a relative path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.glob_set.is_match(path_str.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes_scm() {
        let rules = ExcludeRules::new().unwrap();

        assert!(rules.is_excluded(Path::new(".git")));
        assert!(rules.is_excluded(Path::new(".git/config")));
        assert!(rules.is_excluded(Path::new("META-INF/.svn/entries")));
        assert!(rules.is_excluded(Path::new("CVS")));
        assert!(rules.is_excluded(Path::new("lib/CVS/Root")));
        assert!(rules.is_excluded(Path::new("sub/.gitignore")));
        assert!(rules.is_excluded(Path::new(".hg")));
    }

    #[test]
    fn test_default_excludes_editor_files() {
        let rules = ExcludeRules::new().unwrap();

        assert!(rules.is_excluded(Path::new("notes.txt~")));
        assert!(rules.is_excluded(Path::new("META-INF/#COMPOSITEBUNDLE.MF#")));
        assert!(rules.is_excluded(Path::new(".#lock")));
        assert!(rules.is_excluded(Path::new("sub/._resource")));
        assert!(rules.is_excluded(Path::new("sub/.DS_Store")));
    }

    #[test]
    fn test_normal_files_not_excluded() {
        let rules = ExcludeRules::new().unwrap();

        assert!(!rules.is_excluded(Path::new("META-INF/COMPOSITEBUNDLE.MF")));
        assert!(!rules.is_excluded(Path::new("config/app.properties")));
        assert!(!rules.is_excluded(Path::new("gitlog.txt")));
    }

    #[test]
    fn test_custom_patterns() {
        let rules = ExcludeRules::with_patterns(&["**/*.bak", "scratch/**"]).unwrap();

        assert!(rules.is_excluded(Path::new("config/app.bak")));
        assert!(rules.is_excluded(Path::new("scratch/notes.txt")));
        assert!(rules.is_excluded(Path::new(".git")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ExcludeRules::with_patterns(&["a[b"]).is_err());
    }
}
