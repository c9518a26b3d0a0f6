use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use client_logging::client_info;
use convert_core::GeneratedFile;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically writes files below `dir` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `content` to `{dir}/{relative}`, creating intermediate directories.
    pub fn write(&self, relative: &Path, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;
        let relative = safe_relative(relative)?;

        let target = self.dir.join(&relative);
        let parent = target.parent().unwrap_or(&self.dir).to_path_buf();
        ensure_output_dir(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Saves every generated manifest under `dir`, keyed by its relative path.
pub fn save_generated_files(
    dir: &Path,
    files: &[GeneratedFile],
) -> Result<Vec<PathBuf>, PersistError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let written = files
        .iter()
        .map(|file| writer.write(Path::new(file.path_or_name()), &file.content))
        .collect::<Result<Vec<_>, _>>()?;
    client_info!("wrote {} generated files to {:?}", written.len(), dir);
    Ok(written)
}

fn safe_relative(path: &Path) -> Result<PathBuf, PersistError> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(PersistError::UnsafePath(path.display().to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(PersistError::UnsafePath(path.display().to_string()));
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::safe_relative;
    use std::path::{Path, PathBuf};

    #[test]
    fn nested_relative_paths_are_kept() {
        assert_eq!(
            safe_relative(Path::new("./services/web.yaml")).unwrap(),
            PathBuf::from("services/web.yaml")
        );
    }

    #[test]
    fn escaping_paths_are_rejected() {
        assert!(safe_relative(Path::new("../web.yaml")).is_err());
        assert!(safe_relative(Path::new("/etc/passwd")).is_err());
        assert!(safe_relative(Path::new("")).is_err());
    }
}
