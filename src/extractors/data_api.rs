//! Per-build data endpoint derived from the page's build identifier.
//!
//! Next.js serves the same props as `__NEXT_DATA__` from
//! `/_next/data/<buildId>/<route>.json`. When a page ships neither links
//! nor embedded state, fetching that endpoint is the last per-page option.

use super::json_walk::collect_article_urls;
use super::{Page, PageStrategy};
use crate::article_path::ArticlePath;
use crate::error::{ExtractionError, FetchError, ParseError};
use crate::fetcher::{Fetch, fetch_ok};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

static BUILD_ID_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""buildId"\s*:\s*"([^"]+)""#).unwrap());
static BUILD_ID_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/_next/static/([^/]+)/_(?:buildManifest|ssgManifest)\.js").unwrap()
});

/// Fetches the page's per-build data JSON. Runs only as a fallback.
pub struct DataApiExtractor {
    paths: Arc<ArticlePath>,
}

impl DataApiExtractor {
    pub fn new(paths: Arc<ArticlePath>) -> Self {
        Self { paths }
    }
}

/// Build identifier from the inline JSON field, else from a static asset path.
///
/// # Arguments
///
/// * `body` - Raw HTML of a seed page
///
/// # Returns
///
/// The identifier, borrowed from `body`, or `None` if neither form is
/// present.
pub fn build_id(body: &str) -> Option<&str> {
    BUILD_ID_FIELD
        .captures(body)
        .or_else(|| BUILD_ID_PATH.captures(body))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Data URL for `route`: `/` maps to `index.json`, any other path gets a
/// `.json` suffix, and the query string is carried over.
pub fn data_url(route: &Url, build_id: &str) -> Option<Url> {
    let path = route.path().trim_end_matches('/');
    let mut data_path = if path.is_empty() {
        format!("/_next/data/{build_id}/index.json")
    } else {
        format!("/_next/data/{build_id}{path}.json")
    };
    if let Some(query) = route.query() {
        data_path.push('?');
        data_path.push_str(query);
    }
    route.join(&data_path).ok()
}

#[async_trait]
impl PageStrategy for DataApiExtractor {
    fn name(&self) -> &'static str {
        "data_api"
    }

    fn fallback_only(&self) -> bool {
        true
    }

    #[instrument(level = "debug", skip_all, fields(page = %page.url))]
    async fn attempt(
        &self,
        page: &Page,
        fetcher: &dyn Fetch,
    ) -> Result<Vec<String>, ExtractionError> {
        let build = build_id(&page.body).ok_or(ParseError::MissingBuildId)?;
        let route = Url::parse(&page.url)
            .map_err(|e| FetchError::Http(format!("invalid page URL: {e}")))?;
        let endpoint = data_url(&route, build)
            .ok_or_else(|| FetchError::Http("cannot build data URL".to_string()))?;
        debug!(build_id = build, %endpoint, "Fetching build data");

        let body = fetch_ok(fetcher, endpoint.as_str()).await?;
        let data: serde_json::Value = serde_json::from_str(&body).map_err(ParseError::from)?;
        Ok(collect_article_urls(&data, &self.paths))
    }
}
