//! Recursive collection of article-like strings from untyped JSON.

use crate::article_path::ArticlePath;
use itertools::Itertools;
use serde_json::Value;

/// Walk `value` depth-first and return article URLs in visit order,
/// without duplicates.
///
/// Object members are visited in document order, so links that appear
/// earlier in the page state keep their place in the batch.
///
/// Every string leaf is classified:
/// - begins with the article prefix: resolved against the base URL;
/// - is already an absolute article URL: kept as is;
/// - has the slug shape: treated as a bare article slug.
///
/// The slug rule over-collects: ids, hashes and enum-like strings all
/// pass. Such candidates fail the article metadata fetch and are dropped
/// before notification.
///
/// # Arguments
///
/// * `value` - Parsed page state or data endpoint response
/// * `paths` - Article path rules used to classify and resolve strings
///
/// # Returns
///
/// Absolute article URLs, first occurrence first.
pub fn collect_article_urls(value: &Value, paths: &ArticlePath) -> Vec<String> {
    let mut out = Vec::new();
    visit(value, paths, &mut out);
    out.into_iter().unique().collect()
}

fn visit(value: &Value, paths: &ArticlePath, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| visit(v, paths, out)),
        Value::Array(items) => items.iter().for_each(|v| visit(v, paths, out)),
        Value::String(s) => {
            if let Some(url) = classify(s, paths) {
                out.push(url);
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

fn classify(s: &str, paths: &ArticlePath) -> Option<String> {
    if paths.is_relative_article(s) {
        paths.resolve(s)
    } else if paths.is_absolute_article(s) {
        Some(s.to_string())
    } else if paths.looks_like_slug(s) {
        paths.article_url(s)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn paths() -> ArticlePath {
        ArticlePath::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_walks_nested_structures() {
        let state = json!({
            "props": {
                "pageProps": {
                    "feed": [
                        {"href": "/article/first-post", "views": 12},
                        {"link": "https://www.surfit.io/article/second-post", "pinned": true},
                        {"slug": "third-post-slug", "meta": null}
                    ]
                }
            }
        });

        assert_eq!(
            collect_article_urls(&state, &paths()),
            vec![
                "https://www.surfit.io/article/first-post",
                "https://www.surfit.io/article/second-post",
                "https://www.surfit.io/article/third-post-slug",
            ]
        );
    }

    #[test]
    fn test_ignores_non_matching_strings() {
        let state = json!({
            "title": "A title with spaces",
            "short": "abc",
            "image": "https://cdn.example.com/x.png",
            "tags": ["/tag/rust"]
        });
        assert!(collect_article_urls(&state, &paths()).is_empty());
    }

    #[test]
    fn test_object_members_walked_in_document_order() {
        let state: Value = serde_json::from_str(
            r#"{"props":{"feed":[{"slug":"real-article-1"}]},"buildId":"k3Jd9sL2mQ8xYpZ1aB4cD"}"#,
        )
        .unwrap();
        assert_eq!(
            collect_article_urls(&state, &paths()),
            vec![
                "https://www.surfit.io/article/real-article-1",
                "https://www.surfit.io/article/k3Jd9sL2mQ8xYpZ1aB4cD",
            ]
        );
    }

    #[test]
    fn test_repeated_strings_collected_once() {
        let state = json!(["/article/same", {"again": "/article/same"}]);
        assert_eq!(
            collect_article_urls(&state, &paths()),
            vec!["https://www.surfit.io/article/same"]
        );
    }
}
