//! Notification payloads and delivery.
//!
//! A [`Notification`] is rendered as Slack Block Kit first. If the webhook
//! rejects that, the same content is sent once more as plain text, and the
//! result of that second post is final.
//!
//! # Submodules
//!
//! - [`slack`]: HTTP webhook implementation of [`Notify`]

pub mod slack;

use crate::error::NotifyError;
use crate::models::Notification;
use crate::utils::utc_timestamp;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// Plain-text fallback keeps at most this many article sections.
const FALLBACK_MAX_SECTIONS: usize = 10;

/// A channel that accepts JSON payloads.
///
/// Implemented by [`slack::SlackNotifier`] and by the recording notifier
/// used in tests.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Post one JSON payload to the channel.
    async fn post(&self, payload: &Value) -> Result<(), NotifyError>;
}

/// Escape the three characters Slack treats as control sequences in
/// mrkdwn (`&`, `<`, `>`). Nothing else needs escaping.
pub fn escape_mrkdwn(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Slack mrkdwn for one article: bold link, then the description.
fn section_text(title: &str, url: &str, description: Option<&str>) -> String {
    let mut text = format!("*<{url}|{}>*", escape_mrkdwn(title));
    if let Some(desc) = description {
        text.push('\n');
        text.push_str(&escape_mrkdwn(desc));
    }
    text
}

/// Render a notification as Block Kit.
///
/// # Arguments
///
/// * `notification` - Header and article entries
///
/// # Returns
///
/// A webhook payload with one `header` block followed by one mrkdwn
/// `section` per article. The top-level `text` repeats the header and is
/// what Slack shows in push notifications.
pub fn blocks_payload(notification: &Notification) -> Value {
    let mut blocks = vec![json!({
        "type": "header",
        "text": {"type": "plain_text", "text": notification.header},
    })];
    blocks.extend(notification.items.iter().map(|item| {
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": section_text(&item.title, &item.url, item.description.as_deref()),
            },
        })
    }));

    json!({ "text": notification.header, "blocks": blocks })
}

/// Render a notification as a single plain-text message.
///
/// Used when the structured payload was rejected. The header is followed
/// by at most ten article sections separated by blank lines.
pub fn fallback_payload(notification: &Notification) -> Value {
    let sections: Vec<String> = notification
        .items
        .iter()
        .take(FALLBACK_MAX_SECTIONS)
        .map(|item| section_text(&item.title, &item.url, item.description.as_deref()))
        .collect();
    json!({ "text": format!("{}\n\n{}", notification.header, sections.join("\n\n")) })
}

/// Deliver with one plain-text retry. `Ok` means the channel accepted one
/// of the two payloads.
#[instrument(level = "info", skip_all, fields(items = notification.items.len()))]
pub async fn deliver(notifier: &dyn Notify, notification: &Notification) -> Result<(), NotifyError> {
    match notifier.post(&blocks_payload(notification)).await {
        Ok(()) => {
            info!("Notification delivered");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Structured payload rejected; retrying as plain text");
            notifier.post(&fallback_payload(notification)).await?;
            info!("Plain-text notification delivered");
            Ok(())
        }
    }
}

/// Post a short liveness message so a broken webhook shows up even on runs
/// with nothing to announce.
#[instrument(level = "info", skip_all)]
pub async fn ping(notifier: &dyn Notify) -> Result<(), NotifyError> {
    let payload = json!({ "text": format!("[Surfit Bot] ping {}", utc_timestamp()) });
    notifier.post(&payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationItem;
    use crate::testutil::MockNotifier;

    fn notification(n: usize) -> Notification {
        Notification {
            header: "🧩 Surfit 신규 아티클 - 2025-05-06".to_string(),
            items: (0..n)
                .map(|i| NotificationItem {
                    title: format!("Title {i}"),
                    url: format!("https://www.surfit.io/article/a{i}"),
                    description: (i % 2 == 0).then(|| format!("Desc {i}")),
                })
                .collect(),
        }
    }

    #[test]
    fn test_blocks_payload_shape() {
        let payload = blocks_payload(&notification(2));
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0]["type"], "header");
        assert_eq!(
            blocks[1]["text"]["text"],
            "*<https://www.surfit.io/article/a0|Title 0>*\nDesc 0"
        );
        assert_eq!(blocks[2]["text"]["text"], "*<https://www.surfit.io/article/a1|Title 1>*");
        assert_eq!(payload["text"], "🧩 Surfit 신규 아티클 - 2025-05-06");
    }

    #[test]
    fn test_escape_mrkdwn() {
        assert_eq!(escape_mrkdwn("Q&A <Rust> | tips"), "Q&amp;A &lt;Rust&gt; | tips");
        assert_eq!(escape_mrkdwn("plain 한글"), "plain 한글");
    }

    #[test]
    fn test_titles_and_descriptions_are_escaped() {
        let notification = Notification {
            header: "h".to_string(),
            items: vec![NotificationItem {
                title: "A > B | C".to_string(),
                url: "https://www.surfit.io/article/escaped".to_string(),
                description: Some("1 < 2 & 3".to_string()),
            }],
        };

        let blocks = blocks_payload(&notification);
        assert_eq!(
            blocks["blocks"][1]["text"]["text"],
            "*<https://www.surfit.io/article/escaped|A &gt; B | C>*\n1 &lt; 2 &amp; 3"
        );
        let text = fallback_payload(&notification)["text"].as_str().unwrap().to_string();
        assert!(text.ends_with("*<https://www.surfit.io/article/escaped|A &gt; B | C>*\n1 &lt; 2 &amp; 3"));
    }

    #[test]
    fn test_fallback_payload_caps_sections() {
        let payload = fallback_payload(&notification(12));
        let text = payload["text"].as_str().unwrap();
        assert!(text.starts_with("🧩 Surfit 신규 아티클 - 2025-05-06\n\n*<"));
        assert!(text.contains("article/a9|"));
        assert!(!text.contains("article/a10|"));
        assert!(payload.get("blocks").is_none());
    }

    #[tokio::test]
    async fn test_deliver_structured_success_posts_once() {
        let notifier = MockNotifier::accepting();
        deliver(&notifier, &notification(1)).await.unwrap();
        assert_eq!(notifier.posted().len(), 1);
        assert!(notifier.posted()[0].get("blocks").is_some());
    }

    #[tokio::test]
    async fn test_deliver_falls_back_to_text() {
        let notifier = MockNotifier::with_results(vec![Err(NotifyError::Rejected {
            status: 400,
            body: "invalid_blocks".to_string(),
        })]);
        deliver(&notifier, &notification(1)).await.unwrap();

        let posted = notifier.posted();
        assert_eq!(posted.len(), 2);
        assert!(posted[1].get("blocks").is_none());
    }

    #[tokio::test]
    async fn test_deliver_fails_after_one_retry() {
        let notifier = MockNotifier::rejecting();
        let err = deliver(&notifier, &notification(1)).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert_eq!(notifier.posted().len(), 2);
    }

    #[tokio::test]
    async fn test_ping_text() {
        let notifier = MockNotifier::accepting();
        ping(&notifier).await.unwrap();
        let text = notifier.posted()[0]["text"].as_str().unwrap().to_string();
        assert!(text.starts_with("[Surfit Bot] ping "));
    }
}
