//! Last-resort discovery from the site's sitemaps.
//!
//! Only `<loc>` entries that point at articles are kept. Sitemap indexes
//! that merely list further sitemaps are not followed.

use crate::article_path::ArticlePath;
use crate::error::{ExtractionError, ParseError};
use crate::fetcher::{Fetch, fetch_ok};
use itertools::Itertools;
use once_cell::sync::Lazy;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

static LOC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<loc>\s*([^<\s]+)\s*</loc>").unwrap());

/// Reads a fixed list of sitemap URLs once per run.
pub struct SitemapExtractor {
    paths: Arc<ArticlePath>,
    sitemap_urls: Vec<String>,
}

impl SitemapExtractor {
    /// # Arguments
    ///
    /// * `paths` - Article path rules used to filter `<loc>` values
    /// * `sitemap_urls` - Absolute sitemap URLs, tried in order
    pub fn new(paths: Arc<ArticlePath>, sitemap_urls: Vec<String>) -> Self {
        Self {
            paths,
            sitemap_urls,
        }
    }

    /// Fetch every candidate sitemap in order and collect article URLs,
    /// first occurrence first.
    ///
    /// A sitemap that fails to load is logged and skipped; the result is
    /// empty only when none of them produced an article entry.
    #[instrument(level = "info", skip_all)]
    pub async fn discover(&self, fetcher: &dyn Fetch) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for sitemap in &self.sitemap_urls {
            match self.fetch_sitemap(fetcher, sitemap).await {
                Ok(found) => {
                    info!(%sitemap, count = found.len(), "Sitemap scanned");
                    urls.extend(found);
                }
                Err(e) => warn!(%sitemap, error = %e, "Sitemap unavailable"),
            }
        }
        urls.into_iter().unique().collect()
    }

    async fn fetch_sitemap(
        &self,
        fetcher: &dyn Fetch,
        sitemap: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        let xml = fetch_ok(fetcher, sitemap).await?;
        Ok(self.extract(&xml))
    }

    /// Article `<loc>` values of one sitemap document, in document order.
    ///
    /// Both `www.` and bare-domain URLs are accepted. When the document is
    /// not well-formed XML, `<loc>` elements are matched literally instead.
    ///
    /// # Arguments
    ///
    /// * `xml` - Raw sitemap body
    ///
    /// # Returns
    ///
    /// Matching URLs, duplicates included; [`discover`](Self::discover)
    /// removes them across sitemaps.
    pub fn extract(&self, xml: &str) -> Vec<String> {
        let locs = match parse_locs(xml) {
            Ok(locs) => locs,
            Err(e) => {
                debug!(error = %e, "Sitemap is not well-formed XML; scanning <loc> literally");
                LOC_LITERAL
                    .captures_iter(xml)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect()
            }
        };

        let (articles, others): (Vec<String>, Vec<String>) = locs
            .into_iter()
            .partition(|loc| self.paths.is_sitemap_article(loc));
        if !others.is_empty() {
            debug!(skipped = others.len(), "Ignored non-article <loc> entries");
        }
        articles
    }
}

/// Every `<loc>` text in document order, for both `urlset` and
/// `sitemapindex` documents.
fn parse_locs(xml: &str) -> Result<Vec<String>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::Text(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) if in_loc => {
                let name = String::from_utf8_lossy(&e);
                match resolve_xml_entity(&name) {
                    Some(text) => current.push_str(text),
                    None => {
                        current.push('&');
                        current.push_str(&name);
                        current.push(';');
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
    }
    Ok(locs)
}
