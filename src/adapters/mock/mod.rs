//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses and streams
//! - [`RecordingSink`] - message sink that records what it is given

pub mod http;
pub mod sink;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use sink::RecordingSink;
