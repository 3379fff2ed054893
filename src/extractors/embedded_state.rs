//! Links hidden in the page's embedded hydration state.
//!
//! Next.js pages ship their initial props as JSON inside
//! `<script id="__NEXT_DATA__" type="application/json">`. The listing data
//! is usually in there even when the rendered markup is an empty shell.

use super::json_walk::collect_article_urls;
use super::{Page, PageStrategy};
use crate::article_path::ArticlePath;
use crate::error::{ExtractionError, ParseError};
use crate::fetcher::Fetch;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

static STATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

/// Parses `__NEXT_DATA__` and walks it with
/// [`collect_article_urls`].
pub struct EmbeddedStateExtractor {
    paths: Arc<ArticlePath>,
}

impl EmbeddedStateExtractor {
    pub fn new(paths: Arc<ArticlePath>) -> Self {
        Self { paths }
    }

    /// Article URLs found in the page's embedded state.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw HTML of a seed page
    ///
    /// # Returns
    ///
    /// The walked URLs, or [`ParseError::MissingEmbeddedState`] when the
    /// script is absent or blank, or [`ParseError::Json`] when its content
    /// does not parse.
    pub fn extract(&self, body: &str) -> Result<Vec<String>, ParseError> {
        let raw = embedded_state_text(body).ok_or(ParseError::MissingEmbeddedState)?;
        let state: serde_json::Value = serde_json::from_str(&raw)?;
        let urls = collect_article_urls(&state, &self.paths);
        debug!(count = urls.len(), state_bytes = raw.len(), "Embedded state walked");
        Ok(urls)
    }
}

/// Text content of the `__NEXT_DATA__` script, if present.
pub fn embedded_state_text(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&STATE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
}

#[async_trait]
impl PageStrategy for EmbeddedStateExtractor {
    fn name(&self) -> &'static str {
        "embedded_state"
    }

    async fn attempt(
        &self,
        page: &Page,
        _fetcher: &dyn Fetch,
    ) -> Result<Vec<String>, ExtractionError> {
        Ok(self.extract(&page.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn extractor() -> EmbeddedStateExtractor {
        EmbeddedStateExtractor::new(Arc::new(ArticlePath::from_config(&Config::default()).unwrap()))
    }

    #[test]
    fn test_extracts_from_next_data() {
        let html = r#"<html><body><div id="__next"></div>
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"articles":[{"url":"/article/from-state"}]}},"page":"/"}
            </script></body></html>"#;

        assert_eq!(
            extractor().extract(html).unwrap(),
            vec!["https://www.surfit.io/article/from-state"]
        );
    }

    #[test]
    fn test_missing_script_is_error() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert!(matches!(
            extractor().extract(html),
            Err(ParseError::MissingEmbeddedState)
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props": </script>"#;
        assert!(matches!(extractor().extract(html), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_other_scripts_ignored() {
        let html = r#"<script id="other" type="application/json">{"u":"/article/nope"}</script>"#;
        assert!(extractor().extract(html).is_err());
    }
}
