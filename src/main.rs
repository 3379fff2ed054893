//! # Surfit Notify
//!
//! Finds newly published articles on Surfit, a JavaScript-rendered site,
//! without running JavaScript, and posts them to a Slack incoming webhook.
//! A bounded seen-set on disk keeps repeated runs from announcing the same
//! article twice.
//!
//! ## Usage
//!
//! ```sh
//! SLACK_WEBHOOK_URL=https://hooks.slack.com/services/... surfit_notify
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: fetch each seed page and run the extraction strategies
//!    (raw-text patterns, `__NEXT_DATA__` state, the per-build data API),
//!    falling back to sitemaps when every page is empty
//! 2. **Selection**: drop identifiers already in the seen-set, cap the batch
//! 3. **Notification**: read `og:` metadata per article, post Block Kit,
//!    retry once as plain text
//! 4. **Recording**: add the new identifiers to the seen-set, only after a
//!    confirmed delivery

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod article_path;
mod cli;
mod config;
mod discovery;
mod error;
mod extractors;
mod fetcher;
mod metadata;
mod models;
mod notify;
mod run;
mod seen;
#[cfg(test)]
mod testutil;
mod utils;

use article_path::ArticlePath;
use cli::Cli;
use config::Config;
use error::RunError;
use fetcher::HttpFetcher;
use notify::slack::SlackNotifier;
use run::{RunOptions, run_once};
use seen::SeenStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("surfit_notify starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.cache, args.dry_run, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(max_items) = args.max_items {
        config.max_items = max_items;
        config.validate()?;
    }
    let paths = Arc::new(ArticlePath::from_config(&config)?);

    if args.webhook_url.is_none() && !args.dry_run {
        warn!("SLACK_WEBHOOK_URL not set; delivery will fail");
    }

    let fetcher = HttpFetcher::new(&config)?;
    let notifier = SlackNotifier::new(args.webhook_url.clone())?;
    let store = SeenStore::new(&args.cache, config.seen_capacity);
    let options = RunOptions {
        ping: args.ping,
        dry_run: args.dry_run,
    };

    let outcome = run_once(&config, paths, &fetcher, &notifier, &store, options).await;
    let elapsed = start_time.elapsed();

    match outcome {
        Ok(report) => {
            info!(
                candidates = report.candidates,
                new = report.new,
                sent = report.sent,
                delivered = report.delivered,
                cache_updated = report.cache_updated,
                millis = elapsed.as_millis() as u64,
                "Execution complete"
            );
            Ok(())
        }
        Err(RunError::Delivery(e)) => {
            // Articles stay unseen and are picked up again next run.
            error!(error = %e, millis = elapsed.as_millis() as u64, "Run finished without delivery");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, millis = elapsed.as_millis() as u64, "Run failed");
            Err(e.into())
        }
    }
}
