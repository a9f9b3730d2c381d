//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP operations (streaming GET, bounded POST)
//! - [`StreamSource`] - opens the notification byte stream
//! - [`MessageSink`] - delivers outbound messages

pub mod http;
pub mod sink;
pub mod source;

pub use http::{
    take_capped, ByteStream, CappedBody, Headers, HttpClient, HttpError, RequestLimits, Response,
};
pub use sink::MessageSink;
pub use source::{ConnectError, StreamSource};
