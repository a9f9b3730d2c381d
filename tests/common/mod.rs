//! Common test utilities for integration tests.
//!
//! This module provides fixtures for ntfy stream lines and a builder that
//! wires a relay pipeline against mock HTTP and sink implementations.
//!
//! # Example
//!
//! ```ignore
//! use common::{message_line, TestRelay};
//!
//! let relay = TestRelay::new();
//! relay.run_lines(&[message_line("Alert", "Down")]).await;
//! assert_eq!(relay.sink.texts(), vec!["**Alert**: Down"]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use bytes::Bytes;
use std::sync::Arc;

use ntfy_relay::config::PostProcessorConfig;
use ntfy_relay::postprocess::build_post_processor;
use ntfy_relay::relay::{ConnectionOutcome, RelayPipeline};
use ntfy_relay::traits::{ByteStream, HttpClient, HttpError};

pub const SLACK_URL: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

/// One `message` event line.
pub fn message_line(title: &str, message: &str) -> String {
    serde_json::json!({
        "id": "evt-1",
        "time": 1640995200,
        "event": "message",
        "topic": "alerts",
        "title": title,
        "message": message,
    })
    .to_string()
}

/// One line of a non-message event kind.
pub fn kind_line(kind: &str) -> String {
    serde_json::json!({ "event": kind, "topic": "alerts" }).to_string()
}

/// Join lines into one newline-terminated body.
pub fn stream_body(lines: &[String]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// A byte stream that yields `body` split into chunks of `chunk_size`.
pub fn chunked_stream(body: &str, chunk_size: usize) -> ByteStream {
    let chunks: Vec<Result<Bytes, HttpError>> = body
        .as_bytes()
        .chunks(chunk_size.max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Box::pin(futures::stream::iter(chunks))
}

/// A pipeline over a recording sink, with a mock HTTP client for webhooks.
pub struct TestRelay {
    pub pipeline: RelayPipeline,
    pub sink: RecordingSink,
    pub client: Arc<MockHttpClient>,
}

impl TestRelay {
    /// Pipeline with no post-processing.
    pub fn new() -> Self {
        Self::with_post_processor(&PostProcessorConfig::None)
    }

    pub fn with_post_processor(config: &PostProcessorConfig) -> Self {
        let client = Arc::new(MockHttpClient::new());
        let sink = RecordingSink::new();
        let http: Arc<dyn HttpClient> = client.clone();
        let processor =
            build_post_processor(config, http).expect("post-processor should build");
        Self {
            pipeline: RelayPipeline::new(processor, Arc::new(sink.clone())),
            sink,
            client,
        }
    }

    /// Feed `lines` through the pipeline as one connection.
    pub async fn run_lines(&self, lines: &[String]) -> ConnectionOutcome {
        self.pipeline.run(chunked_stream(&stream_body(lines), 7)).await
    }
}
