//! Slack incoming-webhook client.
//!
//! Slack answers a valid webhook post with `200 ok`. Anything else, a
//! non-2xx status or an error string in the body, counts as a rejection.

use super::Notify;
use crate::error::NotifyError;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(20);

/// Posts payloads to one incoming-webhook URL.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    /// A missing URL is allowed here; every post then fails with
    /// [`NotifyError::MissingWebhook`].
    pub fn new(webhook_url: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// Slack's success criterion for webhook responses.
pub fn is_accepted(status: u16, body: &str) -> bool {
    (200..300).contains(&status) && matches!(body.trim(), "ok" | "")
}

#[async_trait]
impl Notify for SlackNotifier {
    #[instrument(level = "info", skip_all)]
    async fn post(&self, payload: &Value) -> Result<(), NotifyError> {
        let url = self.webhook_url.as_deref().ok_or(NotifyError::MissingWebhook)?;
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, body = %truncate_for_log(&body, 200), "Slack response");

        if is_accepted(status, &body) {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status,
                body: truncate_for_log(&body, 200),
            })
        }
    }
}
