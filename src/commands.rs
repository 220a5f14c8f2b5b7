//! Command implementations shared by CLI and MCP server.

use anyhow::Context;
use serde::Serialize;

use crate::config::{Config, expand_tilde};
use crate::corpus::{Category, Chapter, Corpus, PageRange, Testimony};
use crate::highlight::{highlight_matches, truncate_content};
use crate::images::{GalleryImage, ImageCatalog};
use crate::search::{
    FieldMatch, MatchKey, SearchFilters, SearchIndex, SearchResult, SortOrder, sort_results,
};
use crate::stats::{self, FilterOptions, Page, Stats, paginate};

/// Maximum accepted query length, in chars.
const MAX_QUERY_LENGTH: usize = 1000;

/// Default preview length for result listings.
pub const PREVIEW_LENGTH: usize = 160;

/// Parse comma-separated tags into a vector.
///
/// Splits the input on commas, trims whitespace, and filters out empty strings.
#[must_use]
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Reject queries the search layer should never see.
fn validate_query(query: &str) -> anyhow::Result<()> {
    let len = query.chars().count();
    if len > MAX_QUERY_LENGTH {
        anyhow::bail!("Query too long: {len} chars (max {MAX_QUERY_LENGTH})");
    }
    if query.contains('\0') {
        anyhow::bail!("Query contains invalid character: null byte");
    }
    Ok(())
}

/// Content preview with content matches highlighted.
///
/// Matches that fall past the visible part of the preview are dropped.
#[must_use]
pub fn preview(result: &SearchResult<'_>, max_length: usize) -> String {
    let content = &result.testimony.content;
    let truncated = truncate_content(content, max_length);

    let visible = if truncated.len() == content.len() {
        truncated.chars().count()
    } else {
        truncated.trim_end_matches("...").chars().count()
    };

    let matches: Vec<FieldMatch> = result
        .matches
        .iter()
        .filter(|m| m.key == MatchKey::Content)
        .map(|m| FieldMatch {
            key: m.key,
            ref_index: None,
            indices: m
                .indices
                .iter()
                .copied()
                .filter(|r| r.end < visible)
                .collect(),
        })
        .collect();

    highlight_matches(&truncated, Some(&matches))
}

/// Title with title matches highlighted.
#[must_use]
pub fn highlighted_title(result: &SearchResult<'_>) -> String {
    let matches: Vec<FieldMatch> = result
        .matches
        .iter()
        .filter(|m| m.key == MatchKey::Title)
        .cloned()
        .collect();
    highlight_matches(&result.testimony.title, Some(&matches))
}

/// A testimony together with its resolved images.
#[derive(Debug, Clone, Serialize)]
pub struct TestimonyDetail<'a> {
    #[serde(flatten)]
    pub testimony: &'a Testimony,
    pub gallery: Vec<GalleryImage>,
}

/// Everything the commands need: the search index, the image catalog and
/// the featured list.
#[derive(Debug, Clone)]
pub struct Memorial {
    index: SearchIndex,
    catalog: ImageCatalog,
    featured_ids: Vec<String>,
}

impl Memorial {
    #[must_use]
    pub fn new(index: SearchIndex, catalog: ImageCatalog, featured_ids: Vec<String>) -> Self {
        Self {
            index,
            catalog,
            featured_ids,
        }
    }

    /// Load config from the environment and build from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config, corpus or image manifest cannot be
    /// loaded.
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::load()?;
        Self::from_config(&config)
    }

    /// Build the corpus, index and image catalog described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus or image manifest cannot be loaded.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let corpus = match config.corpus.path {
            Some(ref path) => {
                let path = expand_tilde(path);
                Corpus::load(&path)
                    .with_context(|| format!("Failed to load corpus {}", path.display()))?
            }
            None => Corpus::bundled().context("Failed to load bundled corpus")?,
        };

        let catalog = match config.images.manifest {
            Some(ref manifest) => {
                ImageCatalog::from_manifest(&config.images.base_path, &expand_tilde(manifest))
                    .context("Failed to load image manifest")?
            }
            None => ImageCatalog::builtin(&config.images.base_path),
        };

        let index = SearchIndex::new(corpus, config.search.to_search_config());
        Ok(Self::new(index, catalog, config.featured.ids.clone()))
    }

    #[must_use]
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    #[must_use]
    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// Search, re-sort, and return one page of results.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is too long or contains a null byte.
    pub fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        sort: SortOrder,
        page: usize,
        per_page: usize,
    ) -> anyhow::Result<Page<SearchResult<'_>>> {
        validate_query(query)?;

        let mut results = self.index.search(query, filters);
        if sort != SortOrder::Relevance {
            sort_results(&mut results, sort);
        }

        Ok(paginate(results, page, per_page))
    }

    /// Testimonies in corpus order, optionally narrowed by category and
    /// chapter.
    #[must_use]
    pub fn list(&self, category: Option<Category>, chapter: Option<&str>) -> Vec<&Testimony> {
        self.index
            .all_testimonies()
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .filter(|t| chapter.is_none_or(|c| t.chapter == c))
            .collect()
    }

    /// One testimony with its gallery.
    ///
    /// # Errors
    ///
    /// Returns an error if no testimony has this id.
    pub fn get(&self, id: &str) -> anyhow::Result<TestimonyDetail<'_>> {
        let testimony = self
            .index
            .get_testimony_by_id(id)
            .ok_or_else(|| anyhow::anyhow!("Testimony not found: {id}"))?;

        Ok(TestimonyDetail {
            testimony,
            gallery: self.catalog.gallery_for(testimony),
        })
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        stats::filter_options(self.index.corpus())
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        stats::stats(self.index.corpus())
    }

    #[must_use]
    pub fn featured(&self, count: usize) -> Vec<&Testimony> {
        stats::featured_testimonies(self.index.corpus(), self.featured_ids.as_slice(), count)
    }

    /// Testimonies grouped by chapter.
    #[must_use]
    pub fn chapters(&self) -> Vec<Chapter<'_>> {
        self.index.corpus().chapters()
    }

    /// Every known image, including those outside the naming convention.
    #[must_use]
    pub fn all_images(&self) -> Vec<String> {
        self.catalog.all_images()
    }

    /// Images for `page`, or for `page..=to` when `to` is given.
    #[must_use]
    pub fn page_images(&self, page: u32, to: Option<u32>) -> Vec<String> {
        match to {
            Some(end) => self.catalog.images_for_range(PageRange { start: page, end }),
            None => self.catalog.images_for_page(page),
        }
    }
}
