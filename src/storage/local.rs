//! Local filesystem storage backend.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{StorageBackend, StorageError};

/// Storage backend reading a corpus JSON file from disk.
pub struct LocalStorageBackend {
    path: PathBuf,
}

impl LocalStorageBackend {
    /// Create a backend for the corpus file at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StorageBackend for LocalStorageBackend {
    fn read_corpus(&self) -> Result<String, StorageError> {
        read_file(&self.path)
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read a newline-separated list, skipping blank lines and `#` comments.
///
/// # Errors
///
/// Returns `StorageError` if the file is missing or unreadable.
pub fn read_lines(path: &Path) -> Result<Vec<String>, StorageError> {
    let contents = read_file(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn read_file(path: &Path) -> Result<String, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }

    fs::read_to_string(path)
        .map_err(|e| StorageError::ReadError(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalStorageBackend::new(temp_dir.path().join("testimonies.json"));

        assert!(!backend.exists());
        assert!(matches!(
            backend.read_corpus(),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn reads_corpus_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("testimonies.json");
        fs::write(&path, "[]").unwrap();

        let backend = LocalStorageBackend::new(path);
        assert!(backend.exists());
        assert_eq!(backend.read_corpus().unwrap(), "[]");
    }

    #[test]
    fn read_lines_skips_blanks_and_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("images.txt");
        fs::write(&path, "# photos\n59_Friends_01_1.jpg\n\n  cover.jpg  \n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["59_Friends_01_1.jpg", "cover.jpg"]);
    }
}
