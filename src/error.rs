//! Error types for every stage of a run.
//!
//! Only [`RunError::DiscoveryExhausted`] ends a run early. Fetch and parse
//! failures are recovered where they happen and show up as fewer results;
//! delivery failures leave the seen-set untouched.

use thiserror::Error;

/// A single HTTP attempt that produced nothing usable.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the host.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Server answered with something other than 200.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// 200 with an empty body.
    #[error("empty response body")]
    EmptyBody,

    /// Any other transport or body-decoding failure.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// Malformed or missing structured content in a fetched body.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no embedded state script in page")]
    MissingEmbeddedState,

    #[error("no build identifier in page")]
    MissingBuildId,

    #[error("invalid XML: {0}")]
    Xml(String),
}

/// Why a single strategy attempt came back empty.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The webhook did not accept a payload.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("no webhook URL configured")]
    MissingWebhook,

    #[error("webhook rejected payload (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("webhook transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Transport(e.to_string())
    }
}

/// Terminal outcomes of a run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Every strategy on every page, plus the sitemap fallback, found nothing.
    #[error("no article URLs discovered by any strategy")]
    DiscoveryExhausted,

    /// Both the structured and the plain-text payload were rejected.
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] NotifyError),

    /// The seen-set file could not be created or written.
    #[error("seen-set store error: {0}")]
    SeenStore(#[from] std::io::Error),
}

/// Configuration that could not be read or does not make sense.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
