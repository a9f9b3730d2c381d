//! Post-processing of notification events into outbound text.
//!
//! Exactly one [`PostProcessor`] is selected at startup by
//! [`build_post_processor`]:
//!
//! - [`DefaultFormatter`] - `**title**: body`
//! - [`TemplateTransform`] - renders a template per event
//! - [`WebhookTransform`] - asks an external HTTP service

pub mod default;
pub mod template;
pub mod webhook;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{PostProcessorConfig, TemplateSource};
use crate::error::{ConfigError, ProcessError};
use crate::ntfy::{NotificationEvent, OutboundMessage};
use crate::traits::HttpClient;

pub use default::{default_format, DefaultFormatter};
pub use template::TemplateTransform;
pub use webhook::{backoff_delay, WebhookTransform, BYTES_PER_MB};

/// Turns a notification event into outbound text.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn process(&self, event: &NotificationEvent) -> Result<OutboundMessage, ProcessError>;

    /// Short kind name for logs.
    fn name(&self) -> &'static str;
}

/// Build the configured post-processor.
///
/// Template problems are reported here, before the relay starts.
pub fn build_post_processor(
    config: &PostProcessorConfig,
    client: Arc<dyn HttpClient>,
) -> Result<Box<dyn PostProcessor>, ConfigError> {
    let processor: Box<dyn PostProcessor> = match config {
        PostProcessorConfig::None => {
            tracing::info!("Post-processing disabled, using default format");
            Box::new(DefaultFormatter)
        }
        PostProcessorConfig::Template(TemplateSource::Inline(source)) => {
            tracing::info!(origin = "inline", "Post-processing with template");
            Box::new(TemplateTransform::new(source)?)
        }
        PostProcessorConfig::Template(TemplateSource::File(path)) => {
            tracing::info!(origin = "file", path = %path.display(), "Post-processing with template");
            Box::new(TemplateTransform::from_file(path)?)
        }
        PostProcessorConfig::Webhook(settings) => {
            tracing::info!(
                url = %settings.url,
                timeout_secs = settings.timeout.as_secs(),
                retries = settings.max_retries,
                max_response_mb = settings.max_response_mb,
                "Post-processing with webhook"
            );
            Box::new(WebhookTransform::new(settings.clone(), client))
        }
    };
    Ok(processor)
}
