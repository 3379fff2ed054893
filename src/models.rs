//! Data models shared across the pipeline.
//!
//! - [`ArticleReference`]: one discovered article link and its dedup key
//! - [`DiscoveryResult`]: ordered, duplicate-free list of references
//! - [`ArticleMeta`]: display metadata scraped from an article page
//! - [`Notification`]: the message handed to the notifier

use crate::article_path::ArticlePath;
use serde::Serialize;
use std::collections::HashSet;

/// A discovered article link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleReference {
    /// Absolute URL, used for display and linking.
    pub url: String,
    /// Dedup key derived from the URL's article path segment.
    pub identifier: String,
}

impl ArticleReference {
    /// Derive the identifier from `url` using `paths`.
    pub fn new(url: impl Into<String>, paths: &ArticlePath) -> Self {
        let url = url.into();
        let identifier = paths.identifier(&url);
        Self { url, identifier }
    }
}

/// Candidates in first-seen order. A reference whose identifier is already
/// present is dropped, so the strategy that found an article first keeps
/// its position.
#[derive(Debug, Default, Clone)]
pub struct DiscoveryResult {
    items: Vec<ArticleReference>,
    identifiers: HashSet<String>,
}

impl DiscoveryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the reference was not present yet.
    pub fn push(&mut self, reference: ArticleReference) -> bool {
        if self.identifiers.insert(reference.identifier.clone()) {
            self.items.push(reference);
            true
        } else {
            false
        }
    }

    /// Append URLs in order, returning how many were new.
    pub fn extend_urls<I, S>(&mut self, urls: I, paths: &ArticlePath) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            if self.push(ArticleReference::new(url, paths)) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ArticleReference] {
        &self.items
    }
}

/// Title and description read from an article page's metadata tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    /// `og:title`, else the document `<title>`.
    pub title: Option<String>,
    /// `og:description`, else `meta[name=description]`, at most 280 chars.
    pub description: Option<String>,
}

/// One entry of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationItem {
    /// Display title; generated from the identifier when the page has none.
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

/// A header line plus the ordered articles to announce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub header: String,
    pub items: Vec<NotificationItem>,
}
