//! Notification and outbound message types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a record on the ntfy stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Subscription established
    Open,
    /// Heartbeat
    Keepalive,
    /// A notification to relay
    Message,
    /// Anything else, kept verbatim for logging
    Unknown(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Open => "open",
            EventKind::Keepalive => "keepalive",
            EventKind::Message => "message",
            EventKind::Unknown(raw) => raw,
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::Unknown(String::new())
    }
}

impl From<String> for EventKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open" => EventKind::Open,
            "keepalive" => EventKind::Keepalive,
            "message" => EventKind::Message,
            _ => EventKind::Unknown(raw),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded record from the ntfy JSON stream.
///
/// Field names on the wire are `{id, time, event, topic, title, message}`;
/// missing fields decode to empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationEvent {
    pub id: String,
    /// Unix seconds
    #[serde(rename = "time")]
    pub timestamp: i64,
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub topic: String,
    pub title: String,
    #[serde(rename = "message")]
    pub body: String,
}

impl NotificationEvent {
    /// Shorthand for a `message` event.
    pub fn message(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Message,
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }
}

/// Text ready for the sink, serialized as `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
