use async_trait::async_trait;

use super::PostProcessor;
use crate::error::ProcessError;
use crate::ntfy::{NotificationEvent, OutboundMessage};

/// `**{title}**: {body}`, or just the body when there is no title.
pub fn default_format(event: &NotificationEvent) -> OutboundMessage {
    if event.title.is_empty() {
        OutboundMessage::new(event.body.clone())
    } else {
        OutboundMessage::new(format!("**{}**: {}", event.title, event.body))
    }
}

/// Post-processor used when nothing else is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

#[async_trait]
impl PostProcessor for DefaultFormatter {
    async fn process(&self, event: &NotificationEvent) -> Result<OutboundMessage, ProcessError> {
        Ok(default_format(event))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
