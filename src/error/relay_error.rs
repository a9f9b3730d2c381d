//! Unified error type for the relay.
//!
//! `RelayError` consolidates every domain error so the supervisor can decide
//! recovery from the error alone: fatal errors stop the process, everything
//! else is contained and logged.

use std::fmt;

use super::category::ErrorCategory;
use super::config::{ConfigError, ValidationError};
use super::network::NetworkError;
use super::process::{DeliveryError, ProcessError};
use super::stream::{ParseError, StreamError};

/// Unified error type for the relay.
#[derive(Debug)]
pub enum RelayError {
    /// Malformed domain, topic or URL.
    Validation(ValidationError),

    /// Conflicting or unusable post-processing setup.
    Config(ConfigError),

    /// Source unreachable or answered non-2xx.
    Connection(NetworkError),

    /// Source byte stream failed part-way.
    Stream(StreamError),

    /// One malformed line.
    Parse(ParseError),

    /// Post-processor failure.
    Process(ProcessError),

    /// Sink rejected a message.
    Delivery(DeliveryError),
}

impl RelayError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::Validation(_) | RelayError::Config(_) => ErrorCategory::Configuration,
            RelayError::Connection(err) => match err.status() {
                Some(500..=599) => ErrorCategory::Server,
                Some(_) => ErrorCategory::Rejected,
                None => ErrorCategory::Network,
            },
            RelayError::Stream(_) => ErrorCategory::Network,
            RelayError::Parse(_) => ErrorCategory::Data,
            RelayError::Process(err) if err_is_transport(err) => ErrorCategory::Network,
            RelayError::Process(err) => match err.status() {
                Some(400..=499) => ErrorCategory::Rejected,
                Some(_) => ErrorCategory::Server,
                None => ErrorCategory::Data,
            },
            RelayError::Delivery(err) => match err {
                DeliveryError::Request(_) => ErrorCategory::Network,
                DeliveryError::Status { status: 500..=599 } => ErrorCategory::Server,
                DeliveryError::Status { .. } => ErrorCategory::Rejected,
                DeliveryError::MissingMessage | DeliveryError::Serialize(_) => ErrorCategory::Data,
            },
        }
    }

    /// Whether this error must stop the process.
    pub fn is_fatal(&self) -> bool {
        self.category().is_fatal()
    }

    /// Whether the same operation may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayError::Validation(err) => err.error_code(),
            RelayError::Config(err) => err.error_code(),
            RelayError::Connection(err) => err.error_code(),
            RelayError::Stream(err) => err.error_code(),
            RelayError::Parse(err) => err.error_code(),
            RelayError::Process(err) => err.error_code(),
            RelayError::Delivery(err) => err.error_code(),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

fn err_is_transport(err: &ProcessError) -> bool {
    match err {
        ProcessError::Request(_) => true,
        ProcessError::Exhausted { last, .. } => err_is_transport(last),
        _ => false,
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Validation(err) => write!(f, "{}", err),
            RelayError::Config(err) => write!(f, "{}", err),
            RelayError::Connection(err) => write!(f, "failed to connect to ntfy: {}", err),
            RelayError::Stream(err) => write!(f, "{}", err),
            RelayError::Parse(err) => write!(f, "{}", err),
            RelayError::Process(err) => write!(f, "{}", err),
            RelayError::Delivery(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Validation(err) => Some(err),
            RelayError::Config(err) => Some(err),
            RelayError::Connection(err) => Some(err),
            RelayError::Stream(err) => Some(err),
            RelayError::Parse(err) => Some(err),
            RelayError::Process(err) => Some(err),
            RelayError::Delivery(err) => Some(err),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<ValidationError> for RelayError {
    fn from(err: ValidationError) -> Self {
        RelayError::Validation(err)
    }
}

impl From<ConfigError> for RelayError {
    fn from(err: ConfigError) -> Self {
        RelayError::Config(err)
    }
}

impl From<NetworkError> for RelayError {
    fn from(err: NetworkError) -> Self {
        RelayError::Connection(err)
    }
}

impl From<StreamError> for RelayError {
    fn from(err: StreamError) -> Self {
        RelayError::Stream(err)
    }
}

impl From<ParseError> for RelayError {
    fn from(err: ParseError) -> Self {
        RelayError::Parse(err)
    }
}

impl From<ProcessError> for RelayError {
    fn from(err: ProcessError) -> Self {
        RelayError::Process(err)
    }
}

impl From<DeliveryError> for RelayError {
    fn from(err: DeliveryError) -> Self {
        RelayError::Delivery(err)
    }
}
