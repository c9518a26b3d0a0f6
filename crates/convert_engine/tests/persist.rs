use std::fs;
use std::path::Path;

use convert_core::GeneratedFile;
use convert_engine::{ensure_output_dir, save_generated_files, AtomicFileWriter, PersistError};
use tempfile::TempDir;

fn manifest(name: &str, path: &str, content: &str) -> GeneratedFile {
    GeneratedFile {
        name: name.to_string(),
        content: content.to_string(),
        kind: "deployment".to_string(),
        path: path.to_string(),
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write(Path::new("web.yaml"), "hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write(Path::new("web.yaml"), "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn generated_files_land_at_their_relative_paths() {
    let temp = TempDir::new().unwrap();
    let files = vec![
        manifest("web-deployment.yaml", "deployments/web-deployment.yaml", "kind: Deployment"),
        manifest("web-service.yaml", "", "kind: Service"),
    ];

    let written = save_generated_files(temp.path(), &files).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(
        fs::read_to_string(temp.path().join("deployments/web-deployment.yaml")).unwrap(),
        "kind: Deployment"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("web-service.yaml")).unwrap(),
        "kind: Service"
    );
}

#[test]
fn escaping_manifest_path_is_refused() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let files = vec![manifest("evil.yaml", "../evil.yaml", "x")];

    let err = save_generated_files(&out, &files).unwrap_err();

    assert!(matches!(err, PersistError::UnsafePath(_)));
    assert!(!temp.path().join("evil.yaml").exists());
}

#[test]
fn output_path_that_is_a_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path);
    let result = writer.write(Path::new("doc.yaml"), "data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
}
