//! Discovery orchestration and selection of what to announce.
//!
//! Seed pages are fetched one at a time with a politeness delay between
//! them. Each page goes through the registered [`PageStrategy`] list; the
//! sitemap is consulted only when every page came back empty.

use crate::article_path::ArticlePath;
use crate::config::Config;
use crate::error::RunError;
use crate::extractors::sitemap::SitemapExtractor;
use crate::extractors::{Outcome, Page, PageStrategy, default_strategies};
use crate::fetcher::{Fetch, fetch_ok};
use crate::models::{ArticleReference, DiscoveryResult};
use crate::seen::SeenSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Orchestrates the per-page strategies and the sitemap fallback for one run.
pub struct Discovery<'a> {
    fetcher: &'a dyn Fetch,
    paths: Arc<ArticlePath>,
    seed_pages: Vec<String>,
    politeness_delay: Duration,
    strategies: Vec<Box<dyn PageStrategy>>,
    sitemap: SitemapExtractor,
}

impl<'a> Discovery<'a> {
    /// Build an orchestrator with the default strategy order.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies seed pages, sitemap URLs and the politeness delay
    /// * `paths` - Article path rules shared with every strategy
    /// * `fetcher` - Transport for every request made during discovery
    pub fn new(config: &Config, paths: Arc<ArticlePath>, fetcher: &'a dyn Fetch) -> Self {
        Self {
            fetcher,
            seed_pages: config.seed_pages.clone(),
            politeness_delay: config.politeness_delay(),
            strategies: default_strategies(Arc::clone(&paths)),
            sitemap: SitemapExtractor::new(Arc::clone(&paths), config.sitemap_urls.clone()),
            paths,
        }
    }

    /// Replace the per-page strategy list.
    #[cfg(test)]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn PageStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Run every strategy over every seed page, then the sitemap if needed.
    ///
    /// A seed page that fails to load is skipped. Within a page, every
    /// regular strategy runs and accumulates; fallback strategies run only
    /// while the page has yielded nothing. The sitemap is read once, and
    /// only when all seed pages together produced no candidate.
    ///
    /// # Returns
    ///
    /// Unique candidates in first-seen order, or
    /// [`RunError::DiscoveryExhausted`] when even the sitemap was empty.
    #[instrument(level = "info", skip_all)]
    pub async fn discover(&self) -> Result<DiscoveryResult, RunError> {
        let mut candidates = DiscoveryResult::new();

        for (i, seed) in self.seed_pages.iter().enumerate() {
            if i > 0 && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }

            let body = match fetch_ok(self.fetcher, seed).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(page = %seed, error = %e, "Seed page fetch failed; skipping");
                    continue;
                }
            };
            let page = Page {
                url: seed.clone(),
                body,
            };
            let added = self.scan_page(&page, &mut candidates).await;
            info!(page = %seed, added, total = candidates.len(), "Seed page scanned");
        }

        if candidates.is_empty() {
            info!("No links on any seed page; trying sitemaps");
            let urls = self.sitemap.discover(self.fetcher).await;
            candidates.extend_urls(urls, &self.paths);
        }

        if candidates.is_empty() {
            return Err(RunError::DiscoveryExhausted);
        }
        info!(count = candidates.len(), "Discovery complete");
        Ok(candidates)
    }

    /// Apply the strategy list to one page, returning how many URLs the
    /// strategies reported for it.
    async fn scan_page(&self, page: &Page, candidates: &mut DiscoveryResult) -> usize {
        let mut found_on_page = 0;
        for strategy in &self.strategies {
            if strategy.fallback_only() && found_on_page > 0 {
                debug!(strategy = strategy.name(), "Skipped; page already yielded links");
                continue;
            }

            let outcome = Outcome::from_result(strategy.attempt(page, self.fetcher).await);
            match outcome {
                Outcome::Found(urls) => {
                    let count = urls.len();
                    let added = candidates.extend_urls(urls, &self.paths);
                    debug!(strategy = strategy.name(), count, added, "Strategy found links");
                    found_on_page += count;
                }
                Outcome::Empty => debug!(strategy = strategy.name(), "Strategy found nothing"),
                Outcome::Failed(e) => {
                    debug!(strategy = strategy.name(), error = %e, "Strategy failed; treated as empty")
                }
            }
        }
        found_on_page
    }
}

/// What a run announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Articles not in the seen-set, capped at the batch size.
    New(Vec<ArticleReference>),
    /// Nothing new: the first candidates are sent anyway so the channel
    /// shows the feed is alive. These are never recorded as seen.
    Bootstrap(Vec<ArticleReference>),
}

impl Selection {
    /// The references to announce, in order.
    pub fn items(&self) -> &[ArticleReference] {
        match self {
            Selection::New(items) | Selection::Bootstrap(items) => items,
        }
    }

    /// Whether delivering this selection should update the seen-set.
    pub fn is_new(&self) -> bool {
        matches!(self, Selection::New(_))
    }
}

/// Choose what to announce from the candidates.
///
/// # Arguments
///
/// * `candidates` - Discovery output in first-seen order
/// * `seen` - Identifiers already announced
/// * `max_items` - Batch size
///
/// # Returns
///
/// [`Selection::New`] with up to `max_items` unseen candidates, keeping
/// discovery order. When every candidate is already seen,
/// [`Selection::Bootstrap`] with the first `max_items` candidates.
pub fn select(candidates: &DiscoveryResult, seen: &SeenSet, max_items: usize) -> Selection {
    let new: Vec<ArticleReference> = candidates
        .items()
        .iter()
        .filter(|r| !seen.contains(&r.identifier))
        .take(max_items)
        .cloned()
        .collect();

    if new.is_empty() {
        Selection::Bootstrap(candidates.items().iter().take(max_items).cloned().collect())
    } else {
        Selection::New(new)
    }
}
