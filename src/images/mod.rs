//! Page-based image association.
//!
//! Magazine photographs follow the naming convention
//! `PageNumber_SectionTitle_SectionPageNumber_PhotoNumber.ext`, e.g.
//! `59_Friends_01_2.jpg`. The leading page number ties a photo to the
//! testimonies printed on that page.

pub mod known;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::corpus::{PageRange, Testimony};
use crate::storage::StorageError;
use crate::storage::local::read_lines;

/// URL prefix under which testimony images are served.
pub const DEFAULT_BASE_PATH: &str = "/images/testimonies";

#[allow(clippy::expect_used)]
static IMAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)_(.+)_(\d+)_(\d+)\.(?i:jpe?g|png|webp|gif)$")
        .expect("image name pattern is valid")
});

/// The parts of a filename that follows the magazine convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageName {
    pub page: u32,
    pub section: String,
    pub section_page: u32,
    pub photo: u32,
}

impl ImageName {
    /// Parse a bare filename or a path ending in one.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let filename = file_name(name);
        let caps = IMAGE_NAME_RE.captures(filename)?;

        Some(Self {
            page: caps[1].parse().ok()?,
            section: caps[2].to_string(),
            section_page: caps[3].parse().ok()?,
            photo: caps[4].parse().ok()?,
        })
    }
}

/// An image with the caption to show beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub path: String,
    pub caption: String,
}

/// The set of known image filenames and where they are served from.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    base_path: String,
    filenames: Vec<String>,
    /// Conforming filenames by leading page number, each list sorted.
    by_page: BTreeMap<u32, Vec<String>>,
}

impl Default for ImageCatalog {
    fn default() -> Self {
        Self::builtin(DEFAULT_BASE_PATH)
    }
}

impl ImageCatalog {
    #[must_use]
    pub fn new(base_path: &str, filenames: Vec<String>) -> Self {
        let mut by_page: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for filename in &filenames {
            if let Some(name) = ImageName::parse(filename) {
                by_page.entry(name.page).or_default().push(filename.clone());
            }
        }
        for names in by_page.values_mut() {
            names.sort();
        }

        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            filenames,
            by_page,
        }
    }

    /// The catalog of photographs published with the magazine.
    #[must_use]
    pub fn builtin(base_path: &str) -> Self {
        Self::new(
            base_path,
            known::KNOWN_IMAGES.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    /// Build a catalog from a newline-separated list of filenames.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the manifest cannot be read.
    pub fn from_manifest(base_path: &str, manifest: &Path) -> Result<Self, StorageError> {
        let filenames = read_lines(manifest)?;
        tracing::debug!(
            manifest = %manifest.display(),
            images = filenames.len(),
            "loaded image manifest"
        );
        Ok(Self::new(base_path, filenames))
    }

    /// Full path for a filename.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base_path)
    }

    /// Every known image, conforming to the convention or not.
    #[must_use]
    pub fn all_images(&self) -> Vec<String> {
        self.filenames.iter().map(|f| self.path_for(f)).collect()
    }

    /// Images whose leading page number is `page`.
    ///
    /// Sorted by filename as plain strings, not numerically.
    #[must_use]
    pub fn images_for_page(&self, page: u32) -> Vec<String> {
        self.by_page
            .get(&page)
            .map(|names| names.iter().map(|f| self.path_for(f)).collect())
            .unwrap_or_default()
    }

    /// Images for every page from `range.start` to `range.end`, inclusive.
    #[must_use]
    pub fn images_for_range(&self, range: PageRange) -> Vec<String> {
        if range.start > range.end {
            return Vec::new();
        }
        self.by_page
            .range(range.start..=range.end)
            .flat_map(|(_, names)| names.iter().map(|f| self.path_for(f)))
            .collect()
    }

    /// Images whose section title contains `section`, ignoring case and
    /// punctuation. Filenames outside the convention are matched whole.
    #[must_use]
    pub fn images_for_section(&self, section: &str) -> Vec<String> {
        let needle = normalize(section);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut names: Vec<&String> = self
            .filenames
            .iter()
            .filter(|f| {
                let haystack = match ImageName::parse(f) {
                    Some(name) => normalize(&name.section),
                    None => normalize(f),
                };
                haystack.contains(&needle)
            })
            .collect();
        names.sort();
        names.into_iter().map(|f| self.path_for(f)).collect()
    }

    /// Resolve the images shown with a testimony.
    ///
    /// Curated `images` win; then images for the page range or page; then
    /// images whose section matches the testimony's chapter.
    #[must_use]
    pub fn gallery_for(&self, testimony: &Testimony) -> Vec<GalleryImage> {
        if !testimony.images.is_empty() {
            return testimony
                .images
                .iter()
                .map(|path| GalleryImage {
                    path: path.clone(),
                    caption: testimony
                        .images_captions
                        .get(path)
                        .cloned()
                        .unwrap_or_else(|| page_caption(path, testimony.page)),
                })
                .collect();
        }

        let by_page = match testimony.page_range {
            Some(range) => self.images_for_range(range),
            None => self.images_for_page(testimony.page),
        };

        let paths = if by_page.is_empty() {
            self.images_for_section(&testimony.chapter)
        } else {
            by_page
        };

        paths
            .into_iter()
            .map(|path| {
                let caption = page_caption(&path, testimony.page);
                GalleryImage { path, caption }
            })
            .collect()
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn page_caption(path: &str, fallback_page: u32) -> String {
    let page = ImageName::parse(path).map_or(fallback_page, |n| n.page);
    format!("From page {page}")
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
