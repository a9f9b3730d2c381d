//! Stream connector for an ntfy topic.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::{validate_domain, validate_topic};
use crate::error::NetworkError;
use crate::traits::{ByteStream, ConnectError, Headers, HttpClient, StreamSource};

/// Opens `https://{domain}/{topic}/json` on every [`connect`](StreamSource::connect).
#[derive(Clone)]
pub struct NtfyConnector {
    domain: String,
    topic: String,
    auth: Option<String>,
    client: Arc<dyn HttpClient>,
}

impl NtfyConnector {
    pub fn new(
        domain: impl Into<String>,
        topic: impl Into<String>,
        auth: Option<String>,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            domain: domain.into(),
            topic: topic.into(),
            auth: auth.filter(|token| !token.is_empty()),
            client,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The JSON stream URL, with the topic path-escaped.
    pub fn stream_url(&self) -> String {
        format!(
            "https://{}/{}/json",
            self.domain,
            urlencoding::encode(&self.topic)
        )
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = &self.auth {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}

impl fmt::Debug for NtfyConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtfyConnector")
            .field("domain", &self.domain)
            .field("topic", &self.topic)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl StreamSource for NtfyConnector {
    async fn connect(&self) -> Result<ByteStream, ConnectError> {
        validate_domain(&self.domain)?;
        validate_topic(&self.topic)?;

        let url = self.stream_url();
        tracing::debug!(
            domain = %self.domain,
            topic = %self.topic,
            authenticated = self.auth.is_some(),
            "Connecting to ntfy stream"
        );

        let stream = self
            .client
            .get_stream(&url, &self.headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;

        tracing::info!(domain = %self.domain, topic = %self.topic, "Connected to ntfy stream");
        Ok(stream)
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.domain, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockHttpClient;
    use crate::error::ValidationError;

    fn connector(
        domain: &str,
        topic: &str,
        auth: Option<&str>,
    ) -> (NtfyConnector, Arc<MockHttpClient>) {
        let client = Arc::new(MockHttpClient::new());
        let connector =
            NtfyConnector::new(domain, topic, auth.map(str::to_string), client.clone());
        (connector, client)
    }

    #[test]
    fn test_stream_url() {
        let (connector, _) = connector("ntfy.sh", "alerts", None);
        assert_eq!(connector.stream_url(), "https://ntfy.sh/alerts/json");
        assert_eq!(connector.describe(), "ntfy.sh/alerts");
    }

    #[tokio::test]
    async fn test_connect_sends_bearer_token() {
        let (connector, client) = connector("ntfy.sh", "alerts", Some("tk_abc"));
        client.stream_chunks("https://ntfy.sh/alerts/json", vec!["{\"event\":\"open\"}\n"]);

        assert!(connector.connect().await.is_ok());

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(
            requests[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer tk_abc")
        );
    }

    #[tokio::test]
    async fn test_connect_without_token_has_no_auth_header() {
        let (connector, client) = connector("ntfy.sh", "alerts", None);
        client.stream_chunks("https://ntfy.sh/alerts/json", Vec::<&str>::new());

        connector.connect().await.unwrap();

        let requests = client.get_requests();
        assert!(!requests[0].headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_invalid_topic_never_reaches_network() {
        let (connector, client) = connector("ntfy.sh", "bad/topic", None);

        let err = connector.connect().await.err().expect("connect should fail");

        assert!(matches!(err, ConnectError::Validation(ValidationError::InvalidTopic(_))));
        assert!(err.is_fatal());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_domain_never_reaches_network() {
        let (connector, client) = connector("not_a_domain", "alerts", None);

        let err = connector.connect().await.err().expect("connect should fail");

        assert!(matches!(err, ConnectError::Validation(ValidationError::InvalidDomain(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_2xx_is_connection_error() {
        let (connector, client) = connector("ntfy.sh", "alerts", None);
        client.stream_status("https://ntfy.sh/alerts/json", 502);

        let err = connector.connect().await.err().expect("connect should fail");

        match err {
            ConnectError::Connection(net) => assert_eq!(net.status(), Some(502)),
            other => panic!("expected connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let (connector, _) = connector("ntfy.sh", "alerts", Some("tk_secret"));
        assert!(!format!("{:?}", connector).contains("tk_secret"));
    }
}
