//! Article link extraction strategies.
//!
//! The target site renders its listings client-side, so the links may not
//! be in the raw HTML. Each strategy looks in a different place, from
//! cheapest and most brittle to most expensive:
//!
//! | Strategy | Module | Looks at | Runs |
//! |----------|--------|----------|------|
//! | Pattern | [`pattern`] | raw HTML text | always |
//! | Embedded state | [`embedded_state`] | `__NEXT_DATA__` JSON | always |
//! | Data API | [`data_api`] | `/_next/data/<build>/...json` | only if the page is still empty |
//! | Sitemap | [`sitemap`] | sitemap `<loc>` entries | only if every seed page was empty |
//!
//! Per-page strategies implement [`PageStrategy`]; the orchestrator only
//! sees the trait, so strategies can be added or reordered without touching
//! it. The sitemap runs once per run rather than per page and is driven
//! directly by the orchestrator.

pub mod data_api;
pub mod embedded_state;
pub mod json_walk;
pub mod pattern;
pub mod sitemap;

use crate::article_path::ArticlePath;
use crate::error::ExtractionError;
use crate::fetcher::Fetch;
use async_trait::async_trait;
use std::sync::Arc;

/// A fetched seed page.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL the page was fetched from; the data API derives its route here.
    pub url: String,
    /// Raw response body.
    pub body: String,
}

/// Result of one strategy attempt. Failures are never fatal; the caller
/// logs them and moves on as if the strategy had found nothing.
#[derive(Debug)]
pub enum Outcome {
    /// At least one URL, in discovery order.
    Found(Vec<String>),
    /// The strategy ran and found nothing.
    Empty,
    /// Fetch or parse failure inside the strategy.
    Failed(ExtractionError),
}

impl Outcome {
    /// Classify a strategy result, folding an empty list into [`Outcome::Empty`].
    pub fn from_result(result: Result<Vec<String>, ExtractionError>) -> Self {
        match result {
            Ok(urls) if urls.is_empty() => Outcome::Empty,
            Ok(urls) => Outcome::Found(urls),
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// One way of finding article links on a fetched seed page.
#[async_trait]
pub trait PageStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fallback strategies only run when nothing was found on the page yet.
    fn fallback_only(&self) -> bool {
        false
    }

    /// Absolute article URLs found for `page`, in discovery order.
    async fn attempt(&self, page: &Page, fetcher: &dyn Fetch)
    -> Result<Vec<String>, ExtractionError>;
}

/// Pattern, embedded state, then data API as a fallback.
pub fn default_strategies(paths: Arc<ArticlePath>) -> Vec<Box<dyn PageStrategy>> {
    vec![
        Box::new(pattern::PatternExtractor::new(Arc::clone(&paths))),
        Box::new(embedded_state::EmbeddedStateExtractor::new(Arc::clone(&paths))),
        Box::new(data_api::DataApiExtractor::new(paths)),
    ]
}
