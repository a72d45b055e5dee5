//! Test fixtures for archive assembly
//!
//! Builds throwaway projects on disk: a project descriptor, a primary jar,
//! dependency jars in a local repository directory and an optional
//! resource tree.

#![allow(dead_code)]

use cba_assembler::{
    ArtifactRef, CbaConfig, EffectiveConfig, ProjectDescriptor, Resolution, Scope,
};
use serde_json::Value;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const GROUP_ID: &str = "org.example";
pub const ARTIFACT_ID: &str = "app";
pub const VERSION: &str = "1.0-SNAPSHOT";

/// A project laid out in a temporary directory
pub struct TestProject {
    pub dir: TempDir,
    pub project: ProjectDescriptor,
    pub artifacts: Vec<ArtifactRef>,
}

impl TestProject {
    /// Project with a descriptor and a built primary jar
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pom = dir.path().join("pom.xml");
        fs::write(&pom, "<project><artifactId>app</artifactId></project>\n").unwrap();

        let project = ProjectDescriptor {
            group_id: GROUP_ID.to_string(),
            artifact_id: ARTIFACT_ID.to_string(),
            version: VERSION.to_string(),
            artifact_version: None,
            name: Some("Test Application".to_string()),
            description: Some("Composite application under test".to_string()),
            file: Some(pom),
        };

        let test_project = Self {
            dir,
            project,
            artifacts: Vec::new(),
        };
        write_jar(&test_project.primary_jar(), None);
        test_project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Where the build leaves the primary jar
    pub fn primary_jar(&self) -> PathBuf {
        self.root().join("target/app-1.0-SNAPSHOT.jar")
    }

    /// Where the archive is published
    pub fn archive(&self) -> PathBuf {
        self.root().join("target/app-1.0-SNAPSHOT.cba")
    }

    /// Default location of a caller-provided manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("src/main/cba/META-INF/COMPOSITEBUNDLE.MF")
    }

    /// Add a resolved dependency backed by a jar in the local repository
    pub fn add_dependency(
        &mut self,
        artifact_id: &str,
        scope: Option<Scope>,
        optional: bool,
        direct: bool,
    ) -> &mut Self {
        let file = self
            .root()
            .join("repository")
            .join(format!("{}-{}.jar", artifact_id, VERSION));
        write_jar(&file, None);

        self.artifacts.push(ArtifactRef {
            group_id: GROUP_ID.to_string(),
            artifact_id: artifact_id.to_string(),
            version: VERSION.to_string(),
            artifact_type: None,
            classifier: None,
            scope,
            optional,
            file,
            direct,
        });
        self
    }

    /// The two plain runtime dependencies most scenarios start from
    pub fn with_two_runtime_dependencies(mut self) -> Self {
        self.add_dependency("artifact01", Some(Scope::Runtime), false, true)
            .add_dependency("artifact02", Some(Scope::Runtime), false, true);
        self
    }

    /// Write a caller-provided manifest at its default location
    pub fn write_manifest(&self, text: &str) -> PathBuf {
        let path = self.manifest_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    /// Write a file into the resource directory
    pub fn write_resource(&self, rel: &str, text: &str) {
        let path = self.root().join("src/main/cba").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            project: self.project.clone(),
            artifacts: self.artifacts.clone(),
        }
    }

    /// Resolve configuration from defaults plus the given overrides
    pub fn config(&self, overrides: Value) -> CbaConfig {
        self.try_config(overrides).unwrap()
    }

    pub fn try_config(&self, overrides: Value) -> Result<CbaConfig, cba_assembler::ConfigError> {
        let effective = EffectiveConfig::build(None, Some(overrides), self.root())?;
        effective.resolve(&self.project)
    }
}

/// Write a minimal jar, optionally declaring a bundle symbolic name
pub fn write_jar(path: &Path, symbolic_name: Option<&str>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut manifest = String::from("Manifest-Version: 1.0\n");
    if let Some(name) = symbolic_name {
        manifest.push_str(&format!("Bundle-SymbolicName: {}\n", name));
    }
    zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
    zip.write_all(manifest.as_bytes()).unwrap();
    zip.start_file("org/example/Main.class", options).unwrap();
    zip.write_all(b"\xca\xfe\xba\xbe").unwrap();

    let bytes = zip.finish().unwrap().into_inner();
    fs::write(path, bytes).unwrap();
}

/// Entry names of an archive, sorted
pub fn archive_entries(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

/// Read one archive entry as text
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}
