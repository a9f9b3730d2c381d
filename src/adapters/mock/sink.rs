//! Recording message sink for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Ack, DeliveryError};
use crate::ntfy::OutboundMessage;
use crate::traits::MessageSink;

/// Sink that stores every message it is asked to send.
///
/// Outcomes can be scripted with [`RecordingSink::push_failure`]; unscripted
/// sends succeed with status 200. Failed sends are recorded too.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failures: Arc<Mutex<VecDeque<DeliveryError>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next unscripted send fail with `err`.
    pub fn push_failure(&self, err: DeliveryError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// Messages received so far, in order.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts received so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, message: &OutboundMessage) -> Result<Ack, DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(Ack { status: 200 }),
        }
    }
}
