//! Error category classification for unified error handling.
//!
//! Categories drive the relay's recovery policy: a category decides whether
//! an error is fatal at startup, retried after a delay, or contained to the
//! single line or message it concerns.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection, DNS, timeout).
    /// Transient and retryable.
    Network,

    /// Remote server errors (HTTP 5xx).
    /// Transient and retryable after a delay.
    Server,

    /// The remote side rejected the request (HTTP 4xx).
    /// Retrying the same request cannot help.
    Rejected,

    /// Malformed data received from the source or a transform.
    /// Contained to the item that carried it.
    Data,

    /// Configuration errors (invalid flags, bad URLs, conflicting options).
    /// Fatal at startup.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns true if errors in this category must stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorCategory::Configuration)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Rejected => "rejected",
            ErrorCategory::Data => "data",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check connectivity to the ntfy server and webhooks",
            ErrorCategory::Server => "The remote server is failing; the relay will retry",
            ErrorCategory::Rejected => "Check the webhook URL and the payload it expects",
            ErrorCategory::Data => "The offending item was skipped",
            ErrorCategory::Configuration => "Fix the flags or environment variables and restart",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
