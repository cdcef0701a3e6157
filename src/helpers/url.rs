//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left as-is in query string values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/posts/1/") // -> "/blog/posts/1/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a single query string value
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Build a query string from key/value pairs, skipping empty values
///
/// # Examples
/// ```ignore
/// query_string(&[("q", "rust"), ("tag", "")]) // -> "?q=rust"
/// ```
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, encode_query_value(v)))
        .collect();

    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

/// URL segment for a facet value; never empty
pub fn facet_slug(name: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        encode_query_value(name)
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/assets/style.css"), "/blog/assets/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_query_string() {
        assert_eq!(
            query_string(&[("q", "node js"), ("category", "API Development"), ("tag", "")]),
            "?q=node%20js&category=API%20Development"
        );
        assert_eq!(query_string(&[("q", "")]), "");
        assert_eq!(query_string(&[("tag", "C++")]), "?tag=C%2B%2B");
    }

    #[test]
    fn test_facet_slug() {
        assert_eq!(facet_slug("API Development"), "api-development");
        assert_eq!(facet_slug("Node.js"), "node-js");
    }
}
