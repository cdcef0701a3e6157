//! Post filtering and facet extraction
//!
//! Filtering is criteria-in, posts-out: it never changes the criteria.
//! Selection policy such as toggling a facet off lives with whoever owns the
//! [`FilterCriteria`] (see [`crate::controller`]).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::content::Post;

/// Free-text query plus single-select category and tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    #[serde(rename = "q")]
    pub query: String,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl FilterCriteria {
    /// Criteria that match every post
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    /// Treat empty strings coming from forms or query strings as unset
    pub fn normalized(mut self) -> Self {
        if self.category.as_deref().is_some_and(str::is_empty) {
            self.category = None;
        }
        if self.tag.as_deref().is_some_and(str::is_empty) {
            self.tag = None;
        }
        self
    }

    /// True when any criterion narrows the result
    pub fn has_active_filters(&self) -> bool {
        !self.query.is_empty() || self.category.is_some() || self.tag.is_some()
    }

    /// Whether a single post passes all three criteria
    pub fn matches(&self, post: &Post) -> bool {
        self.matches_query(post) && self.matches_category(post) && self.matches_tag(post)
    }

    fn matches_query(&self, post: &Post) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        post.title.to_lowercase().contains(&needle)
            || post.excerpt.to_lowercase().contains(&needle)
            || post.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, post: &Post) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| post.category == category)
    }

    fn matches_tag(&self, post: &Post) -> bool {
        self.tag
            .as_deref()
            .map_or(true, |tag| post.tags.iter().any(|t| t == tag))
    }
}

/// Posts passing the criteria, in their original order
pub fn filter<'a>(posts: &'a [Post], criteria: &FilterCriteria) -> Vec<&'a Post> {
    posts.iter().filter(|p| criteria.matches(p)).collect()
}

/// Owned variant of [`filter`]
pub fn filter_owned(posts: &[Post], criteria: &FilterCriteria) -> Vec<Post> {
    filter(posts, criteria).into_iter().cloned().collect()
}

/// Distinct categories in first-seen order
pub fn distinct_categories<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .map(|p| p.category.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct tags in first-seen order
pub fn distinct_tags<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .flat_map(|p| p.tags.iter().map(String::as_str))
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// A facet value with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub name: String,
    pub count: usize,
}

fn count_facets<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Facet> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| Facet {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Categories with post counts, first-seen order
pub fn category_counts(posts: &[Post]) -> Vec<Facet> {
    count_facets(posts.iter().map(|p| p.category.as_str()))
}

/// Tags with post counts, first-seen order.
///
/// A tag repeated within one post counts once for that post.
pub fn tag_counts(posts: &[Post]) -> Vec<Facet> {
    count_facets(posts.iter().flat_map(|p| {
        p.tags
            .iter()
            .map(String::as_str)
            .collect::<IndexSet<_>>()
            .into_iter()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posts() -> Vec<Post> {
        vec![
            Post::new("1", "Building REST APIs", "API")
                .with_excerpt("Design endpoints that scale")
                .with_tags(["x", "Node.js"]),
            Post::new("2", "Indexing strategies", "DB")
                .with_excerpt("B-trees and friends")
                .with_tags(["y"]),
            Post::new("3", "GraphQL gateways", "API")
                .with_excerpt("Federation in practice")
                .with_tags(["y", "x", "y"]),
            Post::new("4", "Query planning", "DB")
                .with_excerpt("Reading EXPLAIN output")
                .with_tags(["x"]),
        ]
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let posts = sample_posts();
        let result = filter_owned(&posts, &FilterCriteria::new());
        assert_eq!(result, posts);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let posts = sample_posts();
        let criteria_set = [
            FilterCriteria::new().with_query("a"),
            FilterCriteria::new().with_category("API"),
            FilterCriteria::new().with_tag("x").with_query("q"),
            FilterCriteria::new().with_category("DB").with_tag("y"),
        ];
        for criteria in &criteria_set {
            let once = filter_owned(&posts, criteria);
            let twice = filter_owned(&once, criteria);
            assert_eq!(once, twice, "criteria {:?}", criteria);
        }
    }

    #[test]
    fn test_query_is_case_insensitive_over_title_excerpt_and_tags() {
        let posts = sample_posts();
        assert_eq!(
            ids(&filter(&posts, &FilterCriteria::new().with_query("rest"))),
            vec!["1"]
        );
        assert_eq!(
            ids(&filter(&posts, &FilterCriteria::new().with_query("EXPLAIN"))),
            vec!["4"]
        );
        assert_eq!(
            ids(&filter(&posts, &FilterCriteria::new().with_query("node"))),
            vec!["1"]
        );
        assert!(filter(&posts, &FilterCriteria::new().with_query("nothing")).is_empty());
    }

    #[test]
    fn test_query_does_not_search_category_or_content() {
        let posts = vec![Post::new("1", "Title", "Security").with_content("secret words")];
        assert!(filter(&posts, &FilterCriteria::new().with_query("security")).is_empty());
        assert!(filter(&posts, &FilterCriteria::new().with_query("secret")).is_empty());
    }

    #[test]
    fn test_category_and_tag_are_case_sensitive() {
        let posts = sample_posts();
        assert!(filter(&posts, &FilterCriteria::new().with_category("api")).is_empty());
        assert!(filter(&posts, &FilterCriteria::new().with_tag("X")).is_empty());
    }

    #[test]
    fn test_all_criteria_must_hold() {
        let posts = sample_posts();
        let criteria = FilterCriteria::new().with_category("API").with_tag("x");
        assert_eq!(ids(&filter(&posts, &criteria)), vec!["1", "3"]);

        let criteria = criteria.with_query("graphql");
        assert_eq!(ids(&filter(&posts, &criteria)), vec!["3"]);
    }

    #[test]
    fn test_distinct_facets_keep_first_seen_order() {
        let posts = sample_posts();
        assert_eq!(distinct_categories(&posts), vec!["API", "DB"]);
        assert_eq!(distinct_tags(&posts), vec!["x", "Node.js", "y"]);
    }

    #[test]
    fn test_distinct_facets_of_empty_collection() {
        let posts: Vec<Post> = Vec::new();
        assert!(distinct_categories(&posts).is_empty());
        assert!(distinct_tags(&posts).is_empty());
    }

    #[test]
    fn test_facet_counts() {
        let posts = sample_posts();
        assert_eq!(
            category_counts(&posts),
            vec![
                Facet {
                    name: "API".to_string(),
                    count: 2
                },
                Facet {
                    name: "DB".to_string(),
                    count: 2
                },
            ]
        );
        let tags = tag_counts(&posts);
        assert_eq!(tags[0].name, "x");
        assert_eq!(tags[0].count, 3);
        assert_eq!(tags[2].name, "y");
        assert_eq!(tags[2].count, 2);
    }

    #[test]
    fn test_normalized_drops_empty_selections() {
        let criteria = FilterCriteria {
            query: String::new(),
            category: Some(String::new()),
            tag: Some("x".to_string()),
        }
        .normalized();
        assert_eq!(criteria.category, None);
        assert_eq!(criteria.tag.as_deref(), Some("x"));
        assert!(criteria.has_active_filters());
        assert!(!FilterCriteria::new().has_active_filters());
    }
}
