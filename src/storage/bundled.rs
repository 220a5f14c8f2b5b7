//! Corpus data compiled into the binary.

use crate::storage::{StorageBackend, StorageError};

const BUNDLED_CORPUS: &str = include_str!("../../data/testimonies.json");

/// Storage backend serving the testimonies shipped with the crate.
pub struct BundledStorageBackend;

impl StorageBackend for BundledStorageBackend {
    fn read_corpus(&self) -> Result<String, StorageError> {
        Ok(BUNDLED_CORPUS.to_string())
    }

    fn exists(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "bundled testimonies".to_string()
    }
}
