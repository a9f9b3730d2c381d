//! One connection's worth of relaying: decode, post-process, deliver.

use futures_util::StreamExt;
use std::sync::Arc;

use crate::error::{Ack, DeliveryError, ParseError, StreamError};
use crate::ntfy::{event_stream, EventKind, Frame, NotificationEvent};
use crate::postprocess::{default_format, PostProcessor};
use crate::traits::{ByteStream, MessageSink};

/// How a connection's stream ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutcome {
    /// Server closed the stream
    Eof,
    /// Reading failed part-way
    ReadError(StreamError),
}

/// Sequential event handler for one byte stream at a time.
pub struct RelayPipeline {
    processor: Box<dyn PostProcessor>,
    sink: Arc<dyn MessageSink>,
}

impl RelayPipeline {
    pub fn new(processor: Box<dyn PostProcessor>, sink: Arc<dyn MessageSink>) -> Self {
        Self { processor, sink }
    }

    pub fn processor_name(&self) -> &'static str {
        self.processor.name()
    }

    /// Relay every event of `bytes` until it ends.
    ///
    /// Consumes the stream; it is dropped, and the connection released,
    /// before this returns.
    pub async fn run(&self, bytes: ByteStream) -> ConnectionOutcome {
        let frames = event_stream(bytes);
        tokio::pin!(frames);

        while let Some(item) = frames.next().await {
            match item {
                Ok(Frame::Event(event)) => {
                    self.handle_event(&event).await;
                }
                Ok(Frame::Malformed(err)) => log_malformed(&err),
                Err(err) => return ConnectionOutcome::ReadError(err),
            }
        }
        ConnectionOutcome::Eof
    }

    /// Dispatch one event by kind.
    ///
    /// Returns the delivery result for `message` events and `None` otherwise.
    pub async fn handle_event(
        &self,
        event: &NotificationEvent,
    ) -> Option<Result<Ack, DeliveryError>> {
        match &event.kind {
            EventKind::Open => {
                tracing::info!(topic = %event.topic, "Subscription established");
                None
            }
            EventKind::Keepalive => {
                tracing::debug!("keepalive");
                None
            }
            EventKind::Message => Some(self.relay_message(event).await),
            EventKind::Unknown(kind) => {
                tracing::warn!(event = %kind, event_id = %event.id, "Unknown message event");
                None
            }
        }
    }

    async fn relay_message(&self, event: &NotificationEvent) -> Result<Ack, DeliveryError> {
        tracing::info!(
            event_id = %event.id,
            title = %event.title,
            message = %event.body,
            "Sending message"
        );

        let outbound = match self.processor.process(event).await {
            Ok(outbound) => outbound,
            Err(err) => {
                tracing::warn!(
                    processor = self.processor.name(),
                    error = %err,
                    code = err.error_code(),
                    "Post-processing failed, using default format"
                );
                default_format(event)
            }
        };

        let result = self.sink.send(&outbound).await;
        if let Err(err) = &result {
            tracing::error!(
                event_id = %event.id,
                status = ?err.status(),
                error = %err,
                "Error sending message, dropped"
            );
        }
        result
    }
}

fn log_malformed(err: &ParseError) {
    tracing::error!(line = %err.line, error = %err, code = err.error_code(), "Error while processing ntfy message");
}
