//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Scripted HTTP responses and byte streams
//! - [`mock::RecordingSink`] - Sink that records delivered messages

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, RecordingSink};
pub use reqwest_http::ReqwestHttpClient;
