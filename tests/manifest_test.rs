use scaffolder::manifest::{module_name, ManifestReader};
use scaffolder::Error;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_module_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("go.mod"), "module github.com/acme/tool\n\ngo 1.22\n").unwrap();

    assert_eq!(module_name(dir.path()).unwrap(), "github.com/acme/tool");
}

#[test]
fn test_module_name_with_crlf() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("go.mod"), "module github.com/acme/tool\r\ngo 1.22\r\n").unwrap();

    assert_eq!(module_name(dir.path()).unwrap(), "github.com/acme/tool");
}

#[test]
fn test_empty_manifest() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("go.mod"), "").unwrap();

    let err = module_name(dir.path()).unwrap_err();
    assert!(matches!(err, Error::EmptyManifest { .. }));
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let err = module_name(dir.path()).unwrap_err();
    assert!(matches!(err, Error::ManifestRead { .. }));
}

#[test]
fn test_custom_manifest() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("project.txt"), "package: acme-widgets\n").unwrap();

    let reader = ManifestReader::new("project.txt", "package: ");
    assert_eq!(reader.module_name(dir.path()).unwrap(), "acme-widgets");
}
