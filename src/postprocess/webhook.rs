//! Webhook post-processor.
//!
//! POSTs each event as JSON to an external service and uses the reply as the
//! outbound text. Failed attempts are retried with capped exponential
//! backoff; a 4xx answer is final.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::PostProcessor;
use crate::cli::version::USER_AGENT;
use crate::config::WebhookSettings;
use crate::error::ProcessError;
use crate::ntfy::{NotificationEvent, OutboundMessage};
use crate::traits::{Headers, HttpClient, HttpError, RequestLimits, Response};

pub const BYTES_PER_MB: usize = 1024 * 1024;

/// Longest backoff between attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Error bodies are kept to this many bytes in error messages.
const ERROR_BODY_LIMIT: usize = 1024;

/// Delay before attempt `attempt` (0-based): `min(2^attempt, 30)` seconds.
///
/// The first attempt has no delay.
pub fn backoff_delay(attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs(2u64.saturating_pow(attempt)).min(MAX_BACKOFF)
}

/// Request body sent to the webhook.
///
/// Keys are capitalized (`Id`, `Time`, `Event`, `Topic`, `Title`, `Message`),
/// unlike the lowercase keys of the ntfy stream.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WebhookPayload<'a> {
    id: &'a str,
    time: i64,
    event: &'a str,
    topic: &'a str,
    title: &'a str,
    message: &'a str,
}

impl<'a> From<&'a NotificationEvent> for WebhookPayload<'a> {
    fn from(event: &'a NotificationEvent) -> Self {
        Self {
            id: &event.id,
            time: event.timestamp,
            event: event.kind.as_str(),
            topic: &event.topic,
            title: &event.title,
            message: &event.body,
        }
    }
}

#[derive(Deserialize)]
struct WebhookReply {
    text: String,
}

/// `{"text": ...}` if the body is such a document, otherwise the whole body.
///
/// A truncated body loses its trailing partial character, so the text never
/// grows past the byte cap when decoded.
fn reply_text(body: &[u8], truncated: bool) -> String {
    if let Ok(reply) = serde_json::from_slice::<WebhookReply>(body) {
        return reply.text;
    }
    let body = if truncated { trim_partial_char(body) } else { body };
    String::from_utf8_lossy(body).into_owned()
}

/// Drops an incomplete UTF-8 sequence at the end of `body`.
fn trim_partial_char(body: &[u8]) -> &[u8] {
    // A sequence is at most 4 bytes, so the lead byte is within the last 4
    let window = body.len().saturating_sub(4);
    let Some(lead_at) = body[window..]
        .iter()
        .rposition(|b| b & 0xC0 != 0x80)
        .map(|i| window + i)
    else {
        return body;
    };

    let needed = match body[lead_at] {
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        b if b >= 0xC0 => 2,
        _ => 1,
    };
    if body.len() - lead_at < needed {
        &body[..lead_at]
    } else {
        body
    }
}

fn error_body(response: &Response) -> String {
    let end = response.body.len().min(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&response.body[..end]).trim().to_string()
}

/// Hands each event to an external HTTP service.
pub struct WebhookTransform {
    settings: WebhookSettings,
    client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookTransform")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl WebhookTransform {
    pub fn new(settings: WebhookSettings, client: Arc<dyn HttpClient>) -> Self {
        Self { settings, client }
    }

    pub fn settings(&self) -> &WebhookSettings {
        &self.settings
    }

    fn max_body_bytes(&self) -> usize {
        (self.settings.max_response_mb as usize).saturating_mul(BYTES_PER_MB)
    }

    fn headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
        headers
    }

    /// One POST, classified.
    async fn attempt(&self, payload: &str) -> Result<OutboundMessage, ProcessError> {
        let limits = RequestLimits::new(self.settings.timeout, self.max_body_bytes());
        let response = self
            .client
            .post(&self.settings.url, payload, &Self::headers(), limits)
            .await
            .map_err(ProcessError::Request)?;

        if !response.is_success() {
            return Err(ProcessError::Status {
                status: response.status,
                body: error_body(&response),
            });
        }

        if response.truncated {
            tracing::warn!(
                url = %self.settings.url,
                limit_bytes = limits.max_body_bytes,
                "Webhook response reached the size limit and was truncated"
            );
        }

        Ok(OutboundMessage::new(reply_text(&response.body, response.truncated)))
    }
}

#[async_trait]
impl PostProcessor for WebhookTransform {
    async fn process(&self, event: &NotificationEvent) -> Result<OutboundMessage, ProcessError> {
        let payload = serde_json::to_string(&WebhookPayload::from(event))
            .map_err(|e| ProcessError::Serialize(e.to_string()))?;
        let attempts = self.settings.max_retries.saturating_add(1);
        let mut last = ProcessError::Request(HttpError::Other("no attempt made".to_string()));

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::debug!(
                    attempt,
                    backoff_secs = delay.as_secs(),
                    "Retrying webhook after backoff"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&payload).await {
                Ok(message) => {
                    if attempt > 0 {
                        tracing::debug!(attempt, "Webhook succeeded after retry");
                    }
                    return Ok(message);
                }
                Err(err) if !err.is_retryable() => {
                    tracing::debug!(attempt, error = %err, "Webhook rejected request, not retrying");
                    return Err(err);
                }
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "Webhook attempt failed");
                    last = err;
                }
            }
        }

        Err(ProcessError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
