//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction over the two kinds of HTTP exchange the
//! relay performs: a long-lived streaming GET against the notification source,
//! and short bounded POSTs against the post-processing webhook and the sink.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// An open, readable response body.
///
/// Dropping the stream releases the underlying connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP response wrapper for bounded requests.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body, at most [`RequestLimits::max_body_bytes`] long
    pub body: Bytes,
    /// Whether the body hit the read cap
    pub truncated: bool,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
            truncated: false,
        }
    }

    /// Create a new response with headers.
    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            truncated: false,
        }
    }

    /// Mark the body as cut off at the read cap.
    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Per-request bounds for [`HttpClient::post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// Total time allowed for the request, body read included
    pub timeout: Duration,
    /// Hard cap on the number of body bytes read
    pub max_body_bytes: usize,
}

impl RequestLimits {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Self {
        Self {
            timeout,
            max_body_bytes,
        }
    }
}

/// Accumulates a chunked body up to a fixed byte cap.
#[derive(Debug)]
pub struct CappedBody {
    buf: Vec<u8>,
    limit: usize,
    reached: bool,
}

impl CappedBody {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            reached: false,
        }
    }

    /// Append a chunk. Returns `true` once the cap is reached and reading
    /// should stop.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.reached {
            return true;
        }
        let room = self.limit - self.buf.len();
        if chunk.len() >= room {
            self.buf.extend_from_slice(&chunk[..room]);
            self.reached = true;
        } else {
            self.buf.extend_from_slice(chunk);
        }
        self.reached
    }

    /// The collected bytes and whether the cap was reached.
    pub fn finish(self) -> (Bytes, bool) {
        (Bytes::from(self.buf), self.reached)
    }
}

/// Truncate a chunked body at `limit` bytes.
///
/// Returns the collected bytes and whether the cap was reached.
pub fn take_capped<I>(chunks: I, limit: usize) -> (Bytes, bool)
where
    I: IntoIterator<Item = Bytes>,
{
    let mut body = CappedBody::new(limit);
    for chunk in chunks {
        if body.push(&chunk) {
            break;
        }
    }
    body.finish()
}

/// HTTP client errors.
#[derive(Debug, Clone)]
pub enum HttpError {
    /// Connection failed (refused, reset, DNS)
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Reading the body failed part-way
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl HttpError {
    /// Whether no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        !matches!(self, HttpError::ServerError { .. })
    }

    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and the
/// scripted mock client used in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Open a streaming GET.
    ///
    /// No overall timeout applies; the stream lives until the server closes it
    /// or the caller drops it. A non-2xx status is returned as
    /// [`HttpError::ServerError`].
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;

    /// Perform a POST and read at most `limits.max_body_bytes` of the response.
    ///
    /// Any status is returned as a [`Response`]; only transport failures are
    /// errors.
    async fn post(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
        limits: RequestLimits,
    ) -> Result<Response, HttpError>;
}
