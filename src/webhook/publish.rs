//! Webhook payload construction and delivery.

use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::{BOT_NAME, DESCRIPTION_LIMIT, REQUEST_TIMEOUT, TRUNCATION_MARKER};

/// Message embed understood by the webhook platform.
#[derive(Debug, Serialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Embed body, capped at [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    /// UTC ISO-8601 timestamp, stamped at payload construction time.
    pub timestamp: String,
}

/// Outbound webhook message body.
#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    /// Bot display name.
    pub username: String,
    /// Message embeds; always exactly one.
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    /// Builds the payload for a changelog announcement.
    pub fn new(title: &str, changelog: &str) -> Self {
        Self {
            username: BOT_NAME.to_string(),
            embeds: vec![Embed {
                title: title.to_string(),
                description: truncate_description(changelog),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            }],
        }
    }
}

/// Trims the text and caps it at [`DESCRIPTION_LIMIT`] characters,
/// appending [`TRUNCATION_MARKER`] when content was dropped.
///
/// The cap is counted in characters, not bytes, so multi-byte content
/// never splits mid-sequence.
pub fn truncate_description(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The endpoint accepted the POST.
    Delivered {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Response body text, often empty.
        body: String,
    },
    /// The POST could not be completed: connection failure, timeout, or a
    /// non-success status.
    Failed(String),
    /// No endpoint was resolved; nothing was sent.
    NoEndpoint,
}

impl PublishOutcome {
    /// Whether the changelog reached the endpoint.
    pub fn delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Response body, error text, or the literal `no-webhook`.
    pub fn detail(&self) -> &str {
        match self {
            Self::Delivered { body, .. } => body,
            Self::Failed(reason) => reason,
            Self::NoEndpoint => "no-webhook",
        }
    }
}

/// Posts changelog announcements to a webhook endpoint.
pub struct WebhookPublisher {
    /// HTTP client with the fixed request timeout baked in.
    client: Client,
}

impl WebhookPublisher {
    /// Creates a new publisher.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Publishes the changelog under the given title.
    ///
    /// Every transport failure, timeouts and non-success statuses included,
    /// is converted into [`PublishOutcome::Failed`]; this method never
    /// propagates an error. An absent endpoint is a reported no-op.
    pub async fn publish(
        &self,
        endpoint: Option<&str>,
        changelog: &str,
        title: &str,
    ) -> PublishOutcome {
        let Some(endpoint) = endpoint else {
            println!("No webhook configured; skipping webhook post");
            return PublishOutcome::NoEndpoint;
        };

        let payload = WebhookPayload::new(title, changelog);
        debug!(
            title = %title,
            description_len = payload.embeds[0].description.len(),
            "Prepared webhook payload"
        );

        info!("Posting changelog to webhook");
        match self.post(endpoint, &payload).await {
            Ok((status, body)) => {
                println!("Webhook POST returned {status}");
                PublishOutcome::Delivered { status, body }
            }
            Err(e) => {
                println!("Webhook POST failed: {e}");
                PublishOutcome::Failed(e.to_string())
            }
        }
    }

    async fn post(
        &self,
        endpoint: &str,
        payload: &WebhookPayload,
    ) -> reqwest::Result<(u16, String)> {
        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok((status, body))
    }
}

impl Default for WebhookPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_passes_through_trimmed() {
        assert_eq!(truncate_description("  hello world  "), "hello world");
    }

    #[test]
    fn text_at_the_cap_is_unchanged() {
        let text = "x".repeat(DESCRIPTION_LIMIT);
        assert_eq!(truncate_description(&text), text);
    }

    #[test]
    fn text_over_the_cap_is_truncated_with_marker() {
        let text = "x".repeat(DESCRIPTION_LIMIT + 1);
        let result = truncate_description(&text);

        assert_eq!(
            result.chars().count(),
            DESCRIPTION_LIMIT + TRUNCATION_MARKER.chars().count()
        );
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert_eq!(&result[..DESCRIPTION_LIMIT], &text[..DESCRIPTION_LIMIT]);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(DESCRIPTION_LIMIT + 100);
        let result = truncate_description(&text);

        assert_eq!(
            result.chars().count(),
            DESCRIPTION_LIMIT + TRUNCATION_MARKER.chars().count()
        );
        assert!(result.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn payload_has_the_wire_shape() {
        let payload = WebhookPayload::new("Auto push to main", "abc123 - Alice: fix bug");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["username"], "Release Bot");
        assert_eq!(value["embeds"][0]["title"], "Auto push to main");
        assert_eq!(value["embeds"][0]["description"], "abc123 - Alice: fix bug");

        let timestamp = value["embeds"][0]["timestamp"].as_str().unwrap();
        assert!(timestamp.ends_with('Z'));
        assert!(timestamp.contains('T'));
    }

    #[test]
    fn no_endpoint_detail_is_the_no_webhook_literal() {
        assert_eq!(PublishOutcome::NoEndpoint.detail(), "no-webhook");
        assert!(!PublishOutcome::NoEndpoint.delivered());
    }

    proptest! {
        #[test]
        fn truncation_never_exceeds_cap(text in ".{0,8000}") {
            let result = truncate_description(&text);
            prop_assert!(
                result.chars().count()
                    <= DESCRIPTION_LIMIT + TRUNCATION_MARKER.chars().count()
            );
        }

        #[test]
        fn short_inputs_round_trip(text in ".{0,100}") {
            let result = truncate_description(&text);
            prop_assert_eq!(result.as_str(), text.trim());
        }
    }
}
