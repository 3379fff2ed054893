//! Static run configuration.
//!
//! Every knob the pipeline reads lives in [`Config`]. The defaults target
//! Surfit; a YAML file can override any subset of fields:
//!
//! ```yaml
//! seed_pages:
//!   - https://www.surfit.io/
//!   - https://www.surfit.io/discover
//! max_items: 5
//! politeness_delay_ms: 1000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Run configuration. Missing YAML fields take their [`Default`] value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Site root used to resolve relative article paths.
    pub base_url: String,
    /// Listing pages fetched in order on every run.
    pub seed_pages: Vec<String>,
    /// Sitemaps tried when no seed page yields anything.
    pub sitemap_urls: Vec<String>,
    /// Path segment that marks an article link.
    pub article_prefix: String,
    /// Shortest bare string in embedded JSON treated as an article slug.
    pub min_slug_len: usize,
    /// Most articles sent in one notification.
    pub max_items: usize,
    /// Per-request timeout for page, data and sitemap fetches.
    pub request_timeout_secs: u64,
    /// Pause between seed page fetches.
    pub politeness_delay_ms: u64,
    /// Sent on every discovery request.
    pub user_agent: String,
    /// Sent on every discovery request; Surfit serves Korean content.
    pub accept_language: String,
    /// Identifiers kept in the seen-set.
    pub seen_capacity: usize,
    /// Text of the notification header, before the date.
    pub notification_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.surfit.io".to_string(),
            seed_pages: vec![
                "https://www.surfit.io/".to_string(),
                "https://www.surfit.io/discover".to_string(),
            ],
            sitemap_urls: vec![
                "https://www.surfit.io/sitemap.xml".to_string(),
                "https://www.surfit.io/sitemap-0.xml".to_string(),
                "https://www.surfit.io/sitemap_index.xml".to_string(),
            ],
            article_prefix: "/article/".to_string(),
            min_slug_len: 8,
            max_items: 8,
            request_timeout_secs: 15,
            politeness_delay_ms: 500,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) SurfitSlackBot/1.2".to_string(),
            accept_language: "ko-KR,ko;q=0.9,en;q=0.8".to_string(),
            seen_capacity: 500,
            notification_title: "Surfit 신규 아티클".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional YAML file, falling back to defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML file to read, or `None` for the built-in defaults
    ///
    /// # Returns
    ///
    /// A validated configuration, or the I/O, YAML or validation error.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&raw)?;
                info!(path = %path.display(), "Loaded configuration file");
                config
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Checks that `base_url` parses, at least one seed page is set, the
    /// article prefix is an absolute path, and both `max_items` and
    /// `seen_capacity` are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {e}", self.base_url)))?;
        if self.seed_pages.is_empty() {
            return Err(ConfigError::Invalid("seed_pages is empty".to_string()));
        }
        if !self.article_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "article_prefix {:?} must start with '/'",
                self.article_prefix
            )));
        }
        if self.max_items == 0 {
            return Err(ConfigError::Invalid("max_items must be at least 1".to_string()));
        }
        if self.seen_capacity == 0 {
            return Err(ConfigError::Invalid("seen_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// [`request_timeout_secs`](Self::request_timeout_secs) as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_items, 8);
        assert_eq!(config.seen_capacity, 500);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.base_url, "https://www.surfit.io");
        assert_eq!(config.seed_pages.len(), 2);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_items: 3\npoliteness_delay_ms: 0").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_items, 3);
        assert_eq!(config.politeness_delay(), Duration::ZERO);
        assert_eq!(config.article_prefix, "/article/");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = Config::default();
        config.seed_pages.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_items = 0;
        assert!(config.validate().is_err());
    }
}
