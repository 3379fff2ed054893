//! Plain-text scan of the raw HTML for article links.
//!
//! No parsing at all: fully qualified article URLs first, then quoted
//! relative paths resolved against the base URL. Works whenever the server
//! ships links in the markup or inline scripts.

use super::{Page, PageStrategy};
use crate::article_path::ArticlePath;
use crate::error::ExtractionError;
use crate::fetcher::Fetch;
use async_trait::async_trait;
use itertools::Itertools;
use std::sync::Arc;
use tracing::debug;

/// Regex scan over the page text. Never fails; an unrelated page yields
/// an empty list.
pub struct PatternExtractor {
    paths: Arc<ArticlePath>,
}

impl PatternExtractor {
    pub fn new(paths: Arc<ArticlePath>) -> Self {
        Self { paths }
    }

    /// Article URLs appearing literally in `body`.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw HTML, including inline scripts
    ///
    /// # Returns
    ///
    /// Absolute matches in order of appearance, then resolved quoted
    /// relative paths, with duplicates removed.
    pub fn extract(&self, body: &str) -> Vec<String> {
        let absolute = self.paths.find_absolute(body).map(str::to_string);
        let relative = self
            .paths
            .find_quoted_relative(body)
            .filter_map(|p| self.paths.resolve(p));

        let urls: Vec<String> = absolute.chain(relative).unique().collect();
        debug!(count = urls.len(), "Pattern scan complete");
        urls
    }
}

#[async_trait]
impl PageStrategy for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn attempt(
        &self,
        page: &Page,
        _fetcher: &dyn Fetch,
    ) -> Result<Vec<String>, ExtractionError> {
        Ok(self.extract(&page.body))
    }
}
