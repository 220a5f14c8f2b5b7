//! Exact-match filters applied after the query step.

use serde::Deserialize;

use crate::corpus::{Category, Testimony};

/// Structured filters. Every set field must match (logical AND).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    /// Exact category.
    pub category: Option<Category>,
    /// Exact relationship (e.g., "Sister").
    pub relationship: Option<String>,
    /// Case-insensitive substring of the author name.
    pub author: Option<String>,
    /// At least one item tag must contain one of these, ignoring case.
    /// An empty list does not filter.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SearchFilters {
    /// True when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.relationship.is_none()
            && self.author.is_none()
            && self.tags.is_empty()
    }

    /// Check a testimony against every set filter.
    #[must_use]
    pub fn matches(&self, testimony: &Testimony) -> bool {
        if let Some(category) = self.category
            && testimony.category != category
        {
            return false;
        }

        if let Some(ref relationship) = self.relationship
            && &testimony.relationship != relationship
        {
            return false;
        }

        if let Some(ref author) = self.author
            && !testimony
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
        {
            return false;
        }

        if !self.tags.is_empty() {
            let wanted: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
            let hit = testimony.tags.iter().any(|tag| {
                let tag = tag.to_lowercase();
                wanted.iter().any(|w| tag.contains(w.as_str()))
            });
            if !hit {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testimony() -> Testimony {
        Testimony {
            id: "sunday-kitchen".to_string(),
            title: "Sunday Kitchen".to_string(),
            author: "Elena Rossi".to_string(),
            relationship: "Sister".to_string(),
            content: "Sundays belonged to the kitchen.".to_string(),
            page: 12,
            category: Category::Family,
            tags: vec!["Cooking".to_string(), "family dinners".to_string()],
            chapter: "family".to_string(),
            images: Vec::new(),
            page_range: None,
            images_captions: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn empty_filters_match_everything() {
        let filters = SearchFilters::default();
        assert!(filters.is_empty());
        assert!(filters.matches(&testimony()));
    }

    #[test]
    fn category_must_be_equal() {
        let family = SearchFilters {
            category: Some(Category::Family),
            ..Default::default()
        };
        let friends = SearchFilters {
            category: Some(Category::Friends),
            ..Default::default()
        };

        assert!(family.matches(&testimony()));
        assert!(!friends.matches(&testimony()));
    }

    #[test]
    fn relationship_is_case_sensitive_equality() {
        let exact = SearchFilters {
            relationship: Some("Sister".to_string()),
            ..Default::default()
        };
        let lower = SearchFilters {
            relationship: Some("sister".to_string()),
            ..Default::default()
        };

        assert!(exact.matches(&testimony()));
        assert!(!lower.matches(&testimony()));
    }

    #[test]
    fn author_is_case_insensitive_substring() {
        let filters = SearchFilters {
            author: Some("ROSSI".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&testimony()));

        let filters = SearchFilters {
            author: Some("Bell".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&testimony()));
    }

    #[test]
    fn tags_need_one_overlap() {
        let filters = SearchFilters {
            tags: vec!["music".to_string(), "cook".to_string()],
            ..Default::default()
        };
        assert!(filters.matches(&testimony()));

        let filters = SearchFilters {
            tags: vec!["music".to_string()],
            ..Default::default()
        };
        assert!(!filters.matches(&testimony()));
    }

    #[test]
    fn item_without_tags_fails_tag_filter() {
        let mut t = testimony();
        t.tags.clear();
        let filters = SearchFilters {
            tags: vec!["cooking".to_string()],
            ..Default::default()
        };
        assert!(!filters.matches(&t));
    }

    #[test]
    fn filters_combine_with_and() {
        let filters = SearchFilters {
            category: Some(Category::Family),
            author: Some("bell".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&testimony()));
    }
}
