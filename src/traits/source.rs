//! Notification source trait abstraction.

use async_trait::async_trait;
use std::fmt;

use crate::error::{NetworkError, RelayError, ValidationError};
use crate::traits::ByteStream;

/// Why a source stream could not be acquired.
#[derive(Debug)]
pub enum ConnectError {
    /// Parameters are structurally invalid; never retried.
    Validation(ValidationError),
    /// Source unreachable or answered non-2xx; retried after a delay.
    Connection(NetworkError),
}

impl ConnectError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnectError::Validation(_))
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Validation(err) => write!(f, "{}", err),
            ConnectError::Connection(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConnectError {}

impl From<ValidationError> for ConnectError {
    fn from(err: ValidationError) -> Self {
        ConnectError::Validation(err)
    }
}

impl From<NetworkError> for ConnectError {
    fn from(err: NetworkError) -> Self {
        ConnectError::Connection(err)
    }
}

impl From<ConnectError> for RelayError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Validation(err) => RelayError::Validation(err),
            ConnectError::Connection(err) => RelayError::Connection(err),
        }
    }
}

/// Something that can open the notification byte stream.
///
/// Each call opens a fresh connection; the returned stream is owned by the
/// caller and closed when dropped.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn connect(&self) -> Result<ByteStream, ConnectError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_fatal() {
        let err: ConnectError = ValidationError::InvalidTopic("a/b".to_string()).into();
        assert!(err.is_fatal());
        let relay: RelayError = err.into();
        assert!(relay.is_fatal());
    }

    #[test]
    fn test_connection_is_not_fatal() {
        let err: ConnectError = NetworkError::HttpStatus {
            status: 500,
            message: String::new(),
        }
        .into();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("500"));
    }
}
