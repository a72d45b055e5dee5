//! Bundle symbolic-name derivation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::OsgiError;

const JAR_MANIFEST: &str = "META-INF/MANIFEST.MF";
const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";

/// Derive the bundle symbolic name of an artifact.
///
/// When `file` is a jar whose manifest already declares a
/// `Bundle-SymbolicName`, that name wins. Otherwise the name is computed from
/// the coordinates; a dot-less group id is first replaced by the common
/// package root of the jar's classes when one can be found.
pub fn symbolic_name(
    group_id: &str,
    artifact_id: &str,
    file: Option<&Path>,
) -> Result<String, OsgiError> {
    check_identifiers(group_id, artifact_id)?;

    let jar = match file {
        Some(path) if path.is_file() => Some(open_jar(path)?),
        _ => None,
    };

    if let Some((path, mut archive)) = jar {
        if let Some(name) = declared_symbolic_name(path, &mut archive)? {
            return Ok(name);
        }
        if !group_id.contains('.') {
            if let Some(package) = common_package_root(&archive) {
                return Ok(package);
            }
        }
    }

    symbolic_name_from_coordinates(group_id, artifact_id)
}

/// Derive a bundle symbolic name from Maven coordinates alone.
///
/// - `org.example:example` becomes `org.example`
/// - `org.example:example-core` becomes `org.example.core`
/// - `org.example:widgets` becomes `org.example.widgets`
pub fn symbolic_name_from_coordinates(
    group_id: &str,
    artifact_id: &str,
) -> Result<String, OsgiError> {
    check_identifiers(group_id, artifact_id)?;

    let last_section = group_id.rsplit('.').next().unwrap_or(group_id);

    if artifact_id == last_section {
        return Ok(group_id.to_string());
    }

    if let Some(rest) = artifact_id.strip_prefix(last_section) {
        let rest = match rest.chars().next() {
            Some(c) if c.is_alphanumeric() => rest,
            Some(c) => &rest[c.len_utf8()..],
            None => rest,
        };
        return Ok(format!("{}.{}", group_id, rest));
    }

    Ok(format!("{}.{}", group_id, artifact_id))
}

fn check_identifiers(group_id: &str, artifact_id: &str) -> Result<(), OsgiError> {
    if group_id.trim().is_empty() {
        return Err(OsgiError::EmptyIdentifier("group id"));
    }
    if artifact_id.trim().is_empty() {
        return Err(OsgiError::EmptyIdentifier("artifact id"));
    }
    Ok(())
}

fn open_jar(path: &Path) -> Result<(&Path, ZipArchive<BufReader<File>>), OsgiError> {
    let file = File::open(path).map_err(|source| OsgiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| OsgiError::Jar {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((path, archive))
}

fn declared_symbolic_name(
    path: &Path,
    archive: &mut ZipArchive<BufReader<File>>,
) -> Result<Option<String>, OsgiError> {
    let mut contents = String::new();
    match archive.by_name(JAR_MANIFEST) {
        Ok(mut entry) => {
            entry
                .read_to_string(&mut contents)
                .map_err(|source| OsgiError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(source) => {
            return Err(OsgiError::Jar {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    Ok(main_attribute(&contents, BUNDLE_SYMBOLIC_NAME)
        .and_then(|value| first_clause(&value)))
}

/// Look up a main-section attribute of a jar manifest, joining continuation
/// lines. Attribute names compare case-insensitively.
fn main_attribute(manifest: &str, name: &str) -> Option<String> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in manifest.lines() {
        if line.is_empty() {
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = headers.last_mut() {
                value.push_str(continuation);
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim_start().to_string()));
        }
    }

    headers
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn first_clause(value: &str) -> Option<String> {
    let clause = value.split(',').next()?.split(';').next()?.trim();
    if clause.is_empty() {
        None
    } else {
        Some(clause.to_string())
    }
}

/// Common package root of the classes in a jar, if it has at least two
/// segments.
fn common_package_root(archive: &ZipArchive<BufReader<File>>) -> Option<String> {
    let mut common: Option<Vec<&str>> = None;

    for name in archive.file_names() {
        if !name.ends_with(".class") {
            continue;
        }
        let Some((dir, _)) = name.rsplit_once('/') else {
            continue;
        };
        let sections: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
        common = Some(match common {
            None => sections,
            Some(current) => current
                .iter()
                .zip(sections.iter())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| *a)
                .collect(),
        });
    }

    match common {
        Some(sections) if sections.len() > 1 => Some(sections.join(".")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_jar(dir: &Path, name: &str, entries: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for (entry, contents) in entries {
            zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_artifact_equals_last_group_section() {
        assert_eq!(
            symbolic_name_from_coordinates("org.example", "example").unwrap(),
            "org.example"
        );
    }

    #[test]
    fn test_artifact_prefixed_by_last_group_section() {
        assert_eq!(
            symbolic_name_from_coordinates("org.example", "example-core").unwrap(),
            "org.example.core"
        );
        assert_eq!(
            symbolic_name_from_coordinates("org.example", "exampleutils").unwrap(),
            "org.example.utils"
        );
    }

    #[test]
    fn test_plain_concatenation() {
        assert_eq!(
            symbolic_name_from_coordinates("org.apache.maven.test", "maven-artifact01").unwrap(),
            "org.apache.maven.test.maven-artifact01"
        );
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        assert!(matches!(
            symbolic_name_from_coordinates("", "a"),
            Err(OsgiError::EmptyIdentifier("group id"))
        ));
        assert!(matches!(
            symbolic_name_from_coordinates("g", " "),
            Err(OsgiError::EmptyIdentifier("artifact id"))
        ));
    }

    #[test]
    fn test_declared_name_wins() {
        let dir = TempDir::new().unwrap();
        let jar = write_jar(
            dir.path(),
            "lib.jar",
            &[(
                JAR_MANIFEST,
                "Manifest-Version: 1.0\nBundle-SymbolicName: com.acme.wid\n gets;singleton:=true\n\n",
            )],
        );

        let name = symbolic_name("org.example", "widgets", Some(jar.as_path())).unwrap();
        assert_eq!(name, "com.acme.widgets");
    }

    #[test]
    fn test_jar_without_manifest_uses_coordinates() {
        let dir = TempDir::new().unwrap();
        let jar = write_jar(dir.path(), "lib.jar", &[("org/example/A.class", "")]);

        let name = symbolic_name("org.example", "widgets", Some(jar.as_path())).unwrap();
        assert_eq!(name, "org.example.widgets");
    }

    #[test]
    fn test_dotless_group_uses_package_root() {
        let dir = TempDir::new().unwrap();
        let jar = write_jar(
            dir.path(),
            "lib.jar",
            &[
                ("com/acme/util/A.class", ""),
                ("com/acme/util/inner/B.class", ""),
                ("com/acme/C.class", ""),
            ],
        );

        let name = symbolic_name("acme", "util", Some(jar.as_path())).unwrap();
        assert_eq!(name, "com.acme");
    }

    #[test]
    fn test_single_section_package_ignored() {
        let dir = TempDir::new().unwrap();
        let jar = write_jar(dir.path(), "lib.jar", &[("acme/A.class", "")]);

        let name = symbolic_name("acme", "util", Some(jar.as_path())).unwrap();
        assert_eq!(name, "acme.util");
    }

    #[test]
    fn test_corrupt_jar_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = symbolic_name("org.example", "broken", Some(path.as_path())).unwrap_err();
        assert!(matches!(err, OsgiError::Jar { .. }));
    }

    #[test]
    fn test_missing_file_uses_coordinates() {
        let name = symbolic_name("org.example", "gone", Some(Path::new("/nonexistent/x.jar")))
            .unwrap();
        assert_eq!(name, "org.example.gone");
    }
}
