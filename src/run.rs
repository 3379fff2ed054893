//! One end-to-end run: load seen-set, discover, notify, record.
//!
//! The seen-set is read once at the start and written at most once at the
//! end, and only after the notifier confirmed delivery of genuinely new
//! articles. Only references whose article page actually loaded are sent,
//! and only those are recorded.

use crate::article_path::ArticlePath;
use crate::config::Config;
use crate::discovery::{Discovery, select};
use crate::error::RunError;
use crate::fetcher::Fetch;
use crate::metadata::{fetch_meta, to_item};
use crate::models::{ArticleReference, Notification, NotificationItem};
use crate::notify::{self, Notify};
use crate::seen::SeenStore;
use crate::utils::kst_today;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Switches taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Post a ping message before discovery.
    pub ping: bool,
    /// Discover and render, but do not post or touch the seen-set.
    pub dry_run: bool,
}

/// Counters describing what one run did, logged by `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Unique candidates discovery produced.
    pub candidates: usize,
    /// Selected candidates that were not in the seen-set.
    pub new: usize,
    /// Entries in the notification after unverifiable candidates were dropped.
    pub sent: usize,
    /// The notifier accepted the message.
    pub delivered: bool,
    /// The seen-set file was rewritten.
    pub cache_updated: bool,
}

/// A rendered notification and the references it announces.
#[derive(Debug, Clone)]
pub struct Batch {
    pub notification: Notification,
    /// Same order as `notification.items`.
    pub references: Vec<ArticleReference>,
}

/// Execute one complete discovery and notification cycle.
///
/// Steps:
/// 1. Make sure the seen-set file exists and load it
/// 2. Optionally ping the channel (failure is logged, not fatal)
/// 3. Discover candidates and select what to announce
/// 4. Verify each selected article by fetching its metadata
/// 5. Deliver, then record the sent identifiers if they were new
///
/// # Arguments
///
/// * `config` - Run configuration
/// * `paths` - Compiled article path rules
/// * `fetcher` - Transport for pages, data endpoints, sitemaps and articles
/// * `notifier` - Channel the notification is posted to
/// * `store` - Seen-set file
/// * `options` - Ping and dry-run switches
///
/// # Returns
///
/// A [`RunReport`] on success. [`RunError::DiscoveryExhausted`] when no
/// source yielded a link, [`RunError::Delivery`] when both payloads were
/// rejected; in both cases the seen-set is left as it was.
#[instrument(level = "info", skip_all, fields(cache = %store.path().display()))]
pub async fn run_once(
    config: &Config,
    paths: Arc<ArticlePath>,
    fetcher: &dyn Fetch,
    notifier: &dyn Notify,
    store: &SeenStore,
    options: RunOptions,
) -> Result<RunReport, RunError> {
    store.ensure().await?;
    let mut seen = store.load().await;
    info!(seen = seen.len(), "Seen-set loaded");

    if options.ping && !options.dry_run {
        if let Err(e) = notify::ping(notifier).await {
            warn!(error = %e, "Ping failed; continuing");
        }
    }

    let candidates = Discovery::new(config, paths, fetcher).discover().await?;
    let selection = select(&candidates, &seen, config.max_items);
    let new = if selection.is_new() { selection.items().len() } else { 0 };
    info!(candidates = candidates.len(), new, "Selection made");
    if !selection.is_new() {
        info!("Nothing new; sending the latest candidates without recording them");
    }

    let batch = build_notification(config, fetcher, selection.items()).await;
    let mut report = RunReport {
        candidates: candidates.len(),
        new,
        sent: batch.references.len(),
        delivered: false,
        cache_updated: false,
    };

    if batch.references.is_empty() {
        info!("Every selected candidate was dropped; nothing to send");
        return Ok(report);
    }

    if options.dry_run {
        for item in &batch.notification.items {
            info!(title = %item.title, url = %item.url, "Dry run item");
        }
        return Ok(report);
    }

    if let Err(e) = notify::deliver(notifier, &batch.notification).await {
        error!(error = %e, "Delivery failed; seen-set left unchanged");
        return Err(RunError::Delivery(e));
    }
    report.delivered = true;

    if selection.is_new() {
        for reference in &batch.references {
            seen.insert(&reference.identifier);
        }
        store.save(&seen).await?;
        report.cache_updated = true;
        info!(total = seen.len(), "Seen-set updated");
    }

    Ok(report)
}

/// Fetch metadata for each selected article, one request at a time, and
/// render the notification.
///
/// # Arguments
///
/// * `config` - Supplies the notification title
/// * `fetcher` - Transport for the article pages
/// * `selected` - References in announcement order
///
/// # Returns
///
/// A [`Batch`] holding only the references whose page loaded. Candidates
/// that only looked like slugs (ids, hashes, build ids) fail here and are
/// left out of both the message and the seen-set.
pub async fn build_notification(
    config: &Config,
    fetcher: &dyn Fetch,
    selected: &[ArticleReference],
) -> Batch {
    let verified: Vec<(ArticleReference, NotificationItem)> = stream::iter(selected)
        .filter_map(move |reference| async move {
            fetch_meta(fetcher, &reference.url)
                .await
                .map(|meta| (reference.clone(), to_item(reference, meta)))
        })
        .collect()
        .await;
    let (references, items): (Vec<ArticleReference>, Vec<NotificationItem>) =
        verified.into_iter().unzip();

    Batch {
        notification: Notification {
            header: format!("🧩 {} - {}", config.notification_title, kst_today()),
            items,
        },
        references,
    }
}
