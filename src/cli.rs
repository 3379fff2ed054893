//! Command-line interface definitions.
//!
//! Runtime flags only; the site layout and limits live in the YAML config
//! (see [`crate::config::Config`]).

use clap::Parser;
use std::path::PathBuf;

/// Post newly published Surfit articles to a Slack webhook.
///
/// # Examples
///
/// ```sh
/// # Normal scheduled run
/// SLACK_WEBHOOK_URL=https://hooks.slack.com/services/... surfit_notify
///
/// # See what would be sent without posting or touching the cache
/// surfit_notify --dry-run
///
/// # Custom site layout and cache location
/// surfit_notify --config surfit.yaml --cache /var/lib/surfit/seen.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seen-set cache file
    #[arg(long, default_value = ".cache/surfit_seen.json")]
    pub cache: PathBuf,

    /// Slack incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Override the maximum number of articles per notification
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Send a ping message before discovery to check the webhook
    #[arg(long)]
    pub ping: bool,

    /// Discover and log the selection without posting or updating the cache
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["surfit_notify"]);
        assert_eq!(cli.cache, PathBuf::from(".cache/surfit_seen.json"));
        assert!(cli.config.is_none());
        assert!(cli.max_items.is_none());
        assert!(!cli.ping);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "surfit_notify",
            "-c",
            "/etc/surfit.yaml",
            "--cache",
            "/tmp/seen.json",
            "--webhook-url",
            "https://hooks.slack.test/x",
            "--max-items",
            "3",
            "--ping",
            "--dry-run",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/surfit.yaml")));
        assert_eq!(cli.cache, PathBuf::from("/tmp/seen.json"));
        assert_eq!(cli.webhook_url.as_deref(), Some("https://hooks.slack.test/x"));
        assert_eq!(cli.max_items, Some(3));
        assert!(cli.ping);
        assert!(cli.dry_run);
    }
}
