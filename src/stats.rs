//! Filter options, corpus statistics, featured entries and pagination.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::corpus::{Category, Corpus, Testimony};

/// Hand-picked testimonies for the landing page, in display order.
pub const FEATURED_IDS: [&str; 6] = [
    "rare-soul",
    "sunday-kitchen",
    "the-workshop",
    "the-last-letter",
    "letters-from-the-village",
    "the-long-road",
];

/// Distinct values for each filterable field, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<Category>,
    pub relationships: Vec<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
}

/// Record count, overall and per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    /// Only categories that occur in the corpus are present.
    pub by_category: BTreeMap<Category, usize>,
}

/// Collect the distinct filter values in the corpus.
#[must_use]
pub fn filter_options(corpus: &Corpus) -> FilterOptions {
    let mut categories = BTreeSet::new();
    let mut relationships = BTreeSet::new();
    let mut authors = BTreeSet::new();
    let mut tags = BTreeSet::new();

    for t in corpus.testimonies() {
        categories.insert(t.category);
        relationships.insert(t.relationship.as_str());
        authors.insert(t.author.as_str());
        tags.extend(t.tags.iter().map(String::as_str));
    }

    FilterOptions {
        categories: categories.into_iter().collect(),
        relationships: relationships.into_iter().map(str::to_string).collect(),
        authors: authors.into_iter().map(str::to_string).collect(),
        tags: tags.into_iter().map(str::to_string).collect(),
    }
}

#[must_use]
pub fn stats(corpus: &Corpus) -> Stats {
    let mut by_category = BTreeMap::new();
    for t in corpus.testimonies() {
        *by_category.entry(t.category).or_insert(0) += 1;
    }

    Stats {
        total: corpus.len(),
        by_category,
    }
}

/// Up to `count` testimonies from `ids`, in list order.
///
/// Ids missing from the corpus are skipped.
#[must_use]
pub fn featured_testimonies<'a, S: AsRef<str>>(
    corpus: &'a Corpus,
    ids: &[S],
    count: usize,
) -> Vec<&'a Testimony> {
    ids.iter()
        .filter_map(|id| corpus.get(id.as_ref()))
        .take(count)
        .collect()
}

/// One window of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into the 1-based `page` of size `per_page`.
///
/// Page 0 is treated as page 1 and `per_page` is at least 1. Pages past
/// the end are empty.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::bundled().unwrap()
    }

    mod options {
        use super::*;

        #[test]
        fn sorted_and_distinct() {
            let options = filter_options(&corpus());

            for list in [&options.relationships, &options.authors, &options.tags] {
                let mut expected = list.clone();
                expected.sort();
                expected.dedup();
                assert_eq!(list, &expected);
            }

            let names: Vec<&str> = options.categories.iter().map(|c| c.as_str()).collect();
            let mut expected = names.clone();
            expected.sort_unstable();
            expected.dedup();
            assert_eq!(names, expected);
        }

        #[test]
        fn tags_are_the_union() {
            let options = filter_options(&corpus());
            assert!(options.tags.contains(&"gratitude".to_string()));
            assert!(options.tags.contains(&"carpentry".to_string()));
            assert_eq!(
                options.tags.iter().filter(|t| t.as_str() == "cooking").count(),
                1
            );
        }

        #[test]
        fn empty_corpus() {
            assert_eq!(filter_options(&Corpus::default()), FilterOptions::default());
        }
    }

    mod statistics {
        use super::*;

        #[test]
        fn total_matches_corpus() {
            let corpus = corpus();
            let stats = stats(&corpus);

            assert_eq!(stats.total, corpus.len());
            assert_eq!(stats.by_category.values().sum::<usize>(), corpus.len());
        }

        #[test]
        fn absent_categories_are_absent() {
            let json = r#"[{"id": "a", "title": "A", "author": "X", "relationship": "R",
                "content": "c", "page": 1, "category": "friends"}]"#;
            let stats = stats(&Corpus::from_json(json).unwrap());

            assert_eq!(stats.by_category.len(), 1);
            assert_eq!(stats.by_category.get(&Category::Friends), Some(&1));
            assert!(!stats.by_category.contains_key(&Category::Family));
        }
    }

    mod featured {
        use super::*;

        #[test]
        fn skips_missing_ids_and_keeps_order() {
            let corpus = corpus();
            let featured = featured_testimonies(&corpus, &FEATURED_IDS, 6);
            let ids: Vec<&str> = featured.iter().map(|t| t.id.as_str()).collect();

            assert_eq!(
                ids,
                vec![
                    "rare-soul",
                    "sunday-kitchen",
                    "the-workshop",
                    "letters-from-the-village",
                    "the-long-road",
                ]
            );
        }

        #[test]
        fn respects_count() {
            let corpus = corpus();
            assert_eq!(featured_testimonies(&corpus, &FEATURED_IDS, 2).len(), 2);
            assert!(featured_testimonies(&corpus, &FEATURED_IDS, 0).is_empty());
        }
    }

    mod pagination {
        use super::*;

        #[test]
        fn windows() {
            let page = paginate((1..=7).collect::<Vec<_>>(), 2, 3);

            assert_eq!(page.items, vec![4, 5, 6]);
            assert_eq!(page.total_items, 7);
            assert_eq!(page.total_pages, 3);
        }

        #[test]
        fn last_partial_page() {
            let page = paginate((1..=7).collect::<Vec<_>>(), 3, 3);
            assert_eq!(page.items, vec![7]);
        }

        #[test]
        fn past_the_end_is_empty() {
            let page = paginate((1..=7).collect::<Vec<_>>(), 9, 3);
            assert!(page.items.is_empty());
            assert_eq!(page.total_pages, 3);
        }

        #[test]
        fn zero_page_and_size_are_clamped() {
            let page = paginate(vec!['a', 'b'], 0, 0);
            assert_eq!(page.page, 1);
            assert_eq!(page.per_page, 1);
            assert_eq!(page.items, vec!['a']);
            assert_eq!(page.total_pages, 2);
        }
    }
}
