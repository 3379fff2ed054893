//! Recognising and normalising article links.
//!
//! Articles live under one path convention (`/article/<slug>` on Surfit).
//! [`ArticlePath`] compiles every regex the extractors need from the
//! configured base URL and prefix, so nothing downstream hardcodes the host.

use crate::config::Config;
use crate::error::ConfigError;
use regex::Regex;
use url::Url;

const SLUG_CLASS: &str = r"[A-Za-z0-9\-_]";

/// Compiled article path rules for one site.
#[derive(Debug, Clone)]
pub struct ArticlePath {
    base: Url,
    prefix: String,
    absolute: Regex,
    sitemap_absolute: Regex,
    quoted_relative: Regex,
    relative_start: Regex,
    absolute_start: Regex,
    identifier: Regex,
    slug_shape: Regex,
}

impl ArticlePath {
    /// Compile the rules from `base_url`, `article_prefix` and
    /// `min_slug_len`.
    ///
    /// Sitemap matching also accepts the host without its `www.` prefix.
    ///
    /// # Returns
    ///
    /// The rules, or [`ConfigError::Invalid`] for a base URL without a host.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url: {e}")))?;
        let host = base
            .host_str()
            .ok_or_else(|| ConfigError::Invalid("base_url has no host".to_string()))?;
        let bare_host = host.strip_prefix("www.").unwrap_or(host);

        let host = regex::escape(host);
        let bare_host = regex::escape(bare_host);
        let prefix = regex::escape(&config.article_prefix);
        let min = config.min_slug_len.max(1);

        Ok(Self {
            absolute: Regex::new(&format!(r"https?://{host}{prefix}{SLUG_CLASS}+"))?,
            sitemap_absolute: Regex::new(&format!(
                r"^https?://(?:www\.)?{bare_host}{prefix}{SLUG_CLASS}+"
            ))?,
            quoted_relative: Regex::new(&format!(r#""({prefix}{SLUG_CLASS}+)""#))?,
            relative_start: Regex::new(&format!(r"^{prefix}{SLUG_CLASS}+"))?,
            absolute_start: Regex::new(&format!(r"^https?://{host}{prefix}{SLUG_CLASS}+"))?,
            identifier: Regex::new(&format!(r"{prefix}({SLUG_CLASS}+)"))?,
            slug_shape: Regex::new(&format!(r"^{SLUG_CLASS}{{{min},}}$"))?,
            prefix: config.article_prefix.clone(),
            base,
        })
    }

    /// Dedup key for an article URL: the slug after the prefix, or the
    /// whole URL when the path does not follow the convention.
    pub fn identifier(&self, url: &str) -> String {
        self.identifier
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| url.to_string())
    }

    /// Fully qualified article URLs anywhere in `text`, in order of appearance.
    pub fn find_absolute<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.absolute.find_iter(text).map(|m| m.as_str())
    }

    /// Quoted relative article paths (`"/article/<slug>"`) in `text`,
    /// without the quotes.
    pub fn find_quoted_relative<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.quoted_relative
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Sitemap `<loc>` values accept both `www.` and the bare domain.
    pub fn is_sitemap_article(&self, loc: &str) -> bool {
        self.sitemap_absolute.is_match(loc)
    }

    /// `s` starts with the article prefix.
    pub fn is_relative_article(&self, s: &str) -> bool {
        self.relative_start.is_match(s)
    }

    pub fn is_absolute_article(&self, s: &str) -> bool {
        self.absolute_start.is_match(s)
    }

    /// `s` is made only of slug characters and is at least `min_slug_len`
    /// long.
    pub fn looks_like_slug(&self, s: &str) -> bool {
        self.slug_shape.is_match(s)
    }

    /// Resolve a site-relative path against the base URL.
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.base.join(path).ok().map(|u| u.to_string())
    }

    /// Build the canonical article URL for a bare slug.
    pub fn article_url(&self, slug: &str) -> Option<String> {
        self.resolve(&format!("{}{}", self.prefix, slug))
    }
}
