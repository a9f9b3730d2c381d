//! Reqwest-based HTTP client adapter.
//!
//! This module provides the production HTTP client implementation using
//! reqwest, implementing the [`HttpClient`] trait from `crate::traits`.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::traits::{ByteStream, CappedBody, Headers, HttpClient, HttpError, RequestLimits, Response};

/// Connect timeout used by [`ReqwestHttpClient::for_relay`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use ntfy_relay::adapters::ReqwestHttpClient;
/// use ntfy_relay::traits::{HttpClient, Headers};
///
/// let client = ReqwestHttpClient::for_relay()?;
/// let stream = client.get_stream("https://ntfy.sh/alerts/json", &Headers::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client with a connect timeout and no overall timeout.
    ///
    /// Streaming GETs stay open indefinitely; bounded POSTs carry their own
    /// per-request timeout.
    pub fn for_relay() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a new ReqwestHttpClient with a custom reqwest::Client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert reqwest error to HttpError.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            HttpError::Io(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    /// Apply headers to a request builder.
    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(builder, |builder, (key, value)| builder.header(key, value))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Bound on the error body captured for a failed streaming GET.
const ERROR_BODY_LIMIT: usize = 1024;

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        let builder = Self::apply_headers(self.client.get(url), headers);
        let response = builder.send().await.map_err(Self::convert_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = CappedBody::new(ERROR_BODY_LIMIT);
            let mut chunks = response.bytes_stream();
            while let Some(Ok(chunk)) = chunks.next().await {
                if body.push(&chunk) {
                    break;
                }
            }
            let (bytes, _) = body.finish();
            return Err(HttpError::ServerError {
                status,
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| HttpError::Io(e.to_string())));

        Ok(Box::pin(stream))
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
        limits: RequestLimits,
    ) -> Result<Response, HttpError> {
        let builder = self
            .client
            .post(url)
            .timeout(limits.timeout)
            .body(body.to_string());
        let builder = Self::apply_headers(builder, headers);

        let response = builder.send().await.map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::convert_headers(response.headers());

        let mut capped = CappedBody::new(limits.max_body_bytes);
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(Self::convert_error)?;
            if capped.push(&chunk) {
                break;
            }
        }
        let (body, truncated) = capped.finish();

        Ok(Response::with_headers(status, response_headers, body).with_truncated(truncated))
    }
}
