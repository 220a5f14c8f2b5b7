//! Storage backend trait and implementations.
//!
//! Storage only moves bytes: it hands raw corpus JSON to
//! [`crate::corpus::Corpus`], which owns parsing and validation.

pub mod bundled;
pub mod local;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Failed to read: {0}")]
    ReadError(String),
}

/// Trait for corpus sources (local JSON file, bundled data, etc.).
pub trait StorageBackend: Send + Sync {
    /// Read the raw corpus JSON.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the corpus cannot be located or read.
    fn read_corpus(&self) -> Result<String, StorageError>;

    /// Check whether the corpus is present.
    fn exists(&self) -> bool;

    /// Human-readable description of where the corpus comes from.
    fn describe(&self) -> String;
}
