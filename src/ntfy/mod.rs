//! ntfy source side: event types, stream decoding and the connector.

pub mod connector;
pub mod events;
pub mod parser;

pub use connector::NtfyConnector;
pub use events::{EventKind, NotificationEvent, OutboundMessage};
pub use parser::{decode_line, event_stream, parse_all, parse_line, Frame, LineDecoder, MAX_LINE_BYTES};
