//! Mock HTTP client for testing.
//!
//! Provides a scriptable mock HTTP client that returns predefined responses,
//! response sequences, or byte streams, and records every request made.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{
    take_capped, ByteStream, Headers, HttpClient, HttpError, RequestLimits, Response,
};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
    /// Limits passed to `post`
    pub limits: Option<RequestLimits>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Fail before any response is received
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail mid-stream
    StreamError(Vec<Bytes>, HttpError),
}

/// Mock HTTP client for testing.
///
/// Responses are looked up per URL in this order: the next entry of a queued
/// sequence, a fixed response (exact then prefix match), the default.
///
/// # Example
///
/// ```ignore
/// use ntfy_relay::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_responses(
///     "https://hook.example.com",
///     vec![MockResponse::Success(Response::new(500, Bytes::new()))],
/// );
/// client.set_response(
///     "https://hook.example.com",
///     MockResponse::Success(Response::new(200, Bytes::from("ok"))),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Fixed responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// One-shot responses consumed in order, by exact URL
    sequences: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            sequences: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a fixed response for a URL or URL prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Queue responses served once each, in order, before any fixed response.
    pub fn push_responses(&self, url: &str, responses: Vec<MockResponse>) {
        let mut sequences = self.sequences.lock().unwrap();
        sequences
            .entry(url.to_string())
            .or_default()
            .extend(responses);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Serve `chunks` as the body of a streaming GET.
    pub fn stream_chunks<I, B>(&self, url: &str, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        self.set_response(url, MockResponse::Stream(chunks));
    }

    /// Answer requests to `url` with a bare status.
    ///
    /// Streaming GETs see it as [`HttpError::ServerError`] when non-2xx.
    pub fn stream_status(&self, url: &str, status: u16) {
        self.set_response(url, MockResponse::Success(Response::new(status, Bytes::new())));
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Clear all configured responses and sequences.
    pub fn clear_responses(&self) {
        self.responses.lock().unwrap().clear();
        self.sequences.lock().unwrap().clear();
    }

    fn record_request(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<String>,
        limits: Option<RequestLimits>,
    ) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
            limits,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(queued) = self
            .sequences
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return Some(queued);
        }

        let responses = self.responses.lock().unwrap();

        // First try exact match
        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        // Then try prefix match, longest pattern first
        let mut prefixed: Vec<_> = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .collect();
        prefixed.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));
        if let Some((_, response)) = prefixed.first() {
            return Some((*response).clone());
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn chunk_stream(chunks: Vec<Bytes>, tail: Option<HttpError>) -> ByteStream {
    let items = chunks
        .into_iter()
        .map(Ok)
        .chain(tail.into_iter().map(Err));
    Box::pin(futures::stream::iter(items))
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers, None, None);

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => Ok(chunk_stream(chunks, None)),
            Some(MockResponse::StreamError(chunks, err)) => Ok(chunk_stream(chunks, Some(err))),
            Some(MockResponse::Success(response)) if response.is_success() => {
                Ok(chunk_stream(vec![response.body], None))
            }
            Some(MockResponse::Success(response)) => Err(HttpError::ServerError {
                status: response.status,
                message: response.text_lossy(),
            }),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
        limits: RequestLimits,
    ) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()), Some(limits));

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => {
                let (body, truncated) = take_capped([response.body], limits.max_body_bytes);
                Ok(Response::with_headers(response.status, response.headers, body)
                    .with_truncated(truncated))
            }
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::StreamError(_, err)) => Err(err),
            Some(MockResponse::Stream(chunks)) => {
                let (body, truncated) = take_capped(chunks, limits.max_body_bytes);
                Ok(Response::new(200, body).with_truncated(truncated))
            }
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
