//! Weighted fuzzy search over a testimony corpus.
//!
//! [`SearchIndex`] tokenizes the searchable fields of every testimony once,
//! at construction, and then answers queries as pure reads.

pub mod filter;
pub mod fuzzy;

use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, Testimony};
use crate::search::fuzzy::{Scorer, Word, tokenize};

pub use crate::search::filter::SearchFilters;

/// Default maximum token score that still counts as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Relative importance of each searchable field.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub content: f64,
    pub title: f64,
    pub author: f64,
    pub tags: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            content: 0.4,
            title: 0.3,
            author: 0.2,
            tags: 0.1,
        }
    }
}

/// Index construction settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub weights: FieldWeights,
    /// Query tokens scoring above this do not match a field.
    pub threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// The field a match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKey {
    Title,
    Author,
    Content,
    Tags,
}

/// An inclusive range of char indices into a field's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// Matched positions within one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub key: MatchKey,
    /// Position of the tag within `tags`, for tag matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_index: Option<usize>,
    pub indices: Vec<MatchRange>,
}

/// One testimony returned by [`SearchIndex::search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub testimony: &'a Testimony,
    /// Position in the corpus.
    pub ref_index: usize,
    /// Relevance, lower is better. `None` for queryless listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FieldMatch>,
}

/// Presentation orderings for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Best score first; unscored results keep their order at the end.
    #[default]
    Relevance,
    Author,
    Title,
    Page,
}

/// Re-sort results in place. The sort is stable.
pub fn sort_results(results: &mut [SearchResult<'_>], order: SortOrder) {
    match order {
        SortOrder::Relevance => results.sort_by(|a, b| match (a.score, b.score) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortOrder::Author => results.sort_by_cached_key(|r| r.testimony.author.to_lowercase()),
        SortOrder::Title => results.sort_by_cached_key(|r| r.testimony.title.to_lowercase()),
        SortOrder::Page => results.sort_by_key(|r| r.testimony.page),
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    title: Vec<Word>,
    author: Vec<Word>,
    content: Vec<Word>,
    tags: Vec<Vec<Word>>,
}

impl IndexedEntry {
    fn new(t: &Testimony) -> Self {
        Self {
            title: tokenize(&t.title),
            author: tokenize(&t.author),
            content: tokenize(&t.content),
            tags: t.tags.iter().map(|tag| tokenize(tag)).collect(),
        }
    }
}

/// An immutable search index over one corpus.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    corpus: Corpus,
    entries: Vec<IndexedEntry>,
    config: SearchConfig,
}

impl SearchIndex {
    /// Build the index. The corpus is owned by the index from here on.
    #[must_use]
    pub fn new(corpus: Corpus, config: SearchConfig) -> Self {
        let entries = corpus.testimonies().iter().map(IndexedEntry::new).collect();
        tracing::debug!(
            testimonies = corpus.len(),
            threshold = config.threshold,
            "built search index"
        );

        Self {
            corpus,
            entries,
            config,
        }
    }

    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub fn all_testimonies(&self) -> &[Testimony] {
        self.corpus.testimonies()
    }

    #[must_use]
    pub fn get_testimony_by_id(&self, id: &str) -> Option<&Testimony> {
        self.corpus.get(id)
    }

    /// Search the corpus, then narrow by `filters`.
    ///
    /// An empty or whitespace query lists the whole corpus in order, with
    /// no scores. Otherwise results come back best-first. Filtering never
    /// re-orders.
    #[must_use]
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<SearchResult<'_>> {
        let query = query.trim();

        let mut results: Vec<SearchResult<'_>> = if query.is_empty() {
            self.corpus
                .testimonies()
                .iter()
                .enumerate()
                .map(|(ref_index, testimony)| SearchResult {
                    testimony,
                    ref_index,
                    score: None,
                    matches: Vec::new(),
                })
                .collect()
        } else {
            self.fuzzy_search(query)
        };

        if !filters.is_empty() {
            results.retain(|r| filters.matches(r.testimony));
        }

        tracing::debug!(query, results = results.len(), "search");
        results
    }

    fn fuzzy_search(&self, query: &str) -> Vec<SearchResult<'_>> {
        let tokens: Vec<String> = tokenize(query).into_iter().map(|w| w.text).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let scorer = Scorer::new(self.config.threshold);
        let weights = self.config.weights;

        let mut results: Vec<SearchResult<'_>> = self
            .entries
            .iter()
            .zip(self.corpus.testimonies())
            .enumerate()
            .filter_map(|(ref_index, (entry, testimony))| {
                let mut matches = Vec::new();
                let mut covered = vec![false; tokens.len()];
                let mut score = 1.0_f64;

                let mut cover = |matched: &[bool]| {
                    for (c, &m) in covered.iter_mut().zip(matched) {
                        *c |= m;
                    }
                };

                for (key, words, weight) in [
                    (MatchKey::Title, &entry.title, weights.title),
                    (MatchKey::Author, &entry.author, weights.author),
                    (MatchKey::Content, &entry.content, weights.content),
                ] {
                    let field = scorer.score_field(&tokens, words);
                    if field.is_match() {
                        cover(&field.matched);
                        score *= field.score.max(f64::EPSILON).powf(weight);
                        matches.push(FieldMatch {
                            key,
                            ref_index: None,
                            indices: field.ranges,
                        });
                    }
                }

                let mut best_tag: Option<f64> = None;
                for (tag_index, words) in entry.tags.iter().enumerate() {
                    let field = scorer.score_field(&tokens, words);
                    if field.is_match() {
                        cover(&field.matched);
                        best_tag = Some(best_tag.map_or(field.score, |b| b.min(field.score)));
                        matches.push(FieldMatch {
                            key: MatchKey::Tags,
                            ref_index: Some(tag_index),
                            indices: field.ranges,
                        });
                    }
                }
                if let Some(tag_score) = best_tag {
                    score *= tag_score.max(f64::EPSILON).powf(weights.tags);
                }

                if matches.is_empty() {
                    return None;
                }

                // Tokens matched nowhere in the record pull the score towards 1.
                #[allow(clippy::cast_precision_loss)]
                let coverage =
                    covered.iter().filter(|&&c| c).count() as f64 / tokens.len() as f64;

                Some(SearchResult {
                    testimony,
                    ref_index,
                    score: Some(score.powf(coverage)),
                    matches,
                })
            })
            .collect();

        sort_results(&mut results, SortOrder::Relevance);
        results
    }
}
