//! Testimony records and corpus loading.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::bundled::BundledStorageBackend;
use crate::storage::local::LocalStorageBackend;
use crate::storage::{StorageBackend, StorageError};

/// Errors that can occur when loading a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to parse corpus: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Corpus must be a JSON array or an object with a \"testimonies\" array")]
    InvalidFormat,

    #[error("Invalid testimony at index {index} (id: {id}): {source}")]
    InvalidRecord {
        index: usize,
        id: String,
        source: serde_json::Error,
    },
}

/// The closed set of testimony categories.
///
/// Variants are declared alphabetically so the derived ordering matches
/// the lexicographic ordering of their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Colleagues,
    Elders,
    Family,
    Friends,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Colleagues,
        Category::Elders,
        Category::Family,
        Category::Friends,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Colleagues => "colleagues",
            Category::Elders => "elders",
            Category::Family => "family",
            Category::Friends => "friends",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, Error)]
#[error("unknown category '{0}' (expected one of: colleagues, elders, family, friends)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// An inclusive range of magazine pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// A single authored memorial entry.
///
/// Optional collections default to empty when absent from the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimony {
    /// Slug identifier (e.g., "rare-soul").
    pub id: String,
    pub title: String,
    pub author: String,
    /// How the author knew Tony (e.g., "Sister", "Friend").
    pub relationship: String,
    pub content: String,
    /// Page number in the printed magazine.
    pub page: u32,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Chapter slug used for display grouping.
    #[serde(default)]
    pub chapter: String,
    /// Curated image paths, taking precedence over page-derived images.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_range: Option<PageRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images_captions: BTreeMap<String, String>,
}

/// The testimonies of a chapter, in corpus order.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter<'a> {
    pub slug: &'a str,
    pub testimonies: Vec<&'a Testimony>,
}

/// A loaded testimony corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    testimonies: Vec<Testimony>,
}

impl Corpus {
    /// Wrap already-parsed testimonies.
    ///
    /// Duplicate ids are kept but logged; lookups by id return the first.
    #[must_use]
    pub fn new(testimonies: Vec<Testimony>) -> Self {
        let mut seen = HashSet::new();
        for t in &testimonies {
            if !seen.insert(t.id.as_str()) {
                tracing::warn!(id = %t.id, "duplicate testimony id in corpus");
            }
        }

        Self { testimonies }
    }

    /// Load a corpus from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Storage` if the file is missing or unreadable.
    /// Returns `CorpusError::ParseError`, `InvalidFormat` or `InvalidRecord`
    /// if the JSON cannot be turned into testimonies.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        Self::from_storage(&LocalStorageBackend::new(path.to_path_buf()))
    }

    /// Load the corpus shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data is malformed.
    pub fn bundled() -> Result<Self, CorpusError> {
        Self::from_storage(&BundledStorageBackend)
    }

    /// Load a corpus through any storage backend.
    ///
    /// # Errors
    ///
    /// See [`Corpus::load`].
    pub fn from_storage(storage: &dyn StorageBackend) -> Result<Self, CorpusError> {
        if !storage.exists() {
            return Err(StorageError::NotFound(storage.describe()).into());
        }
        let contents = storage.read_corpus()?;
        let corpus = Self::from_json(&contents)?;
        tracing::info!(
            source = %storage.describe(),
            testimonies = corpus.len(),
            "loaded corpus"
        );
        Ok(corpus)
    }

    /// Parse a corpus from JSON text.
    ///
    /// Accepts a bare array of testimonies or an object holding a
    /// `testimonies` array.
    ///
    /// # Errors
    ///
    /// See [`Corpus::load`].
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let records = match value {
            serde_json::Value::Array(records) => records,
            serde_json::Value::Object(mut map) => match map.remove("testimonies") {
                Some(serde_json::Value::Array(records)) => records,
                _ => return Err(CorpusError::InvalidFormat),
            },
            _ => return Err(CorpusError::InvalidFormat),
        };

        let testimonies = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let id = record
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("<missing>")
                    .to_string();
                serde_json::from_value(record)
                    .map_err(|source| CorpusError::InvalidRecord { index, id, source })
            })
            .collect::<Result<Vec<Testimony>, _>>()?;

        Ok(Self::new(testimonies))
    }

    #[must_use]
    pub fn testimonies(&self) -> &[Testimony] {
        &self.testimonies
    }

    /// Look up a testimony by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Testimony> {
        self.testimonies.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.testimonies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.testimonies.is_empty()
    }

    /// Group testimonies by chapter slug, in order of first appearance.
    #[must_use]
    pub fn chapters(&self) -> Vec<Chapter<'_>> {
        let mut chapters: Vec<Chapter<'_>> = Vec::new();
        for t in &self.testimonies {
            match chapters.iter_mut().find(|c| c.slug == t.chapter) {
                Some(chapter) => chapter.testimonies.push(t),
                None => chapters.push(Chapter {
                    slug: &t.chapter,
                    testimonies: vec![t],
                }),
            }
        }
        chapters
    }
}
