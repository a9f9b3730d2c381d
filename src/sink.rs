//! Delivery to the Slack-compatible webhook.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Ack, DeliveryError};
use crate::ntfy::OutboundMessage;
use crate::traits::{Headers, HttpClient, MessageSink, RequestLimits};

/// Fixed timeout for one delivery.
pub const SINK_TIMEOUT: Duration = Duration::from_secs(3);

/// Bound on the response body read for diagnostics.
pub const SINK_DIAGNOSTIC_LIMIT: usize = 64 * 1024;

/// POSTs `{"text": ...}` to a fixed URL.
pub struct WebhookSink {
    url: String,
    client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSink").field("url", &self.url).finish_non_exhaustive()
    }
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessageSink for WebhookSink {
    async fn send(&self, message: &OutboundMessage) -> Result<Ack, DeliveryError> {
        let body =
            serde_json::to_string(message).map_err(|e| DeliveryError::Serialize(e.to_string()))?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let response = self
            .client
            .post(
                &self.url,
                &body,
                &headers,
                RequestLimits::new(SINK_TIMEOUT, SINK_DIAGNOSTIC_LIMIT),
            )
            .await
            .map_err(DeliveryError::Request)?;

        tracing::debug!(
            status = response.status,
            body = %response.text_lossy(),
            truncated = response.truncated,
            "Sink response"
        );

        if response.status >= 400 {
            return Err(DeliveryError::Status {
                status: response.status,
            });
        }
        Ok(Ack {
            status: response.status,
        })
    }
}
