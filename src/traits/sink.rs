//! Delivery sink trait abstraction.

use async_trait::async_trait;

use crate::error::{Ack, DeliveryError};
use crate::ntfy::OutboundMessage;

/// Destination for outbound messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &OutboundMessage) -> Result<Ack, DeliveryError>;

    /// Deliver a message that may be absent.
    ///
    /// An absent message is rejected before any network call.
    async fn send_optional(
        &self,
        message: Option<&OutboundMessage>,
    ) -> Result<Ack, DeliveryError> {
        match message {
            Some(message) => self.send(message).await,
            None => Err(DeliveryError::MissingMessage),
        }
    }
}
