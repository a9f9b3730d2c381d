//! Streaming-related error types.
//!
//! Two failure classes live here and must stay distinct: a [`ParseError`]
//! concerns one line and is skipped, while a [`StreamError`] concerns the
//! byte stream itself and ends the connection.

use std::fmt;

/// Failure of the source byte stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Reading from the byte stream failed part-way.
    ReadFailed {
        message: String,
    },

    /// A line grew past the buffer limit without a newline.
    LineTooLong {
        limit: usize,
    },
}

impl StreamError {
    /// A stream failure always warrants a reconnect.
    pub fn should_reconnect(&self) -> bool {
        true
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ReadFailed { .. } => {
                "The connection to the ntfy server was lost. Reconnecting...".to_string()
            }
            StreamError::LineTooLong { limit } => {
                format!("The ntfy server sent a line longer than {} bytes. Reconnecting...", limit)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ReadFailed { .. } => "E_STREAM_READ",
            StreamError::LineTooLong { .. } => "E_STREAM_LINE",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ReadFailed { message } => {
                write!(f, "Stream read failed: {}", message)
            }
            StreamError::LineTooLong { limit } => {
                write!(f, "line exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for StreamError {}

/// Why a single line could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// The line is not valid UTF-8.
    InvalidUtf8,
    /// The line is not a JSON notification record.
    InvalidJson(String),
}

/// A single malformed line from the source stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Raw line content, lossily decoded
    pub line: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn invalid_utf8(raw: &[u8]) -> Self {
        Self {
            line: String::from_utf8_lossy(raw).into_owned(),
            kind: ParseErrorKind::InvalidUtf8,
        }
    }

    pub fn invalid_json(line: &str, err: &serde_json::Error) -> Self {
        Self {
            line: line.to_string(),
            kind: ParseErrorKind::InvalidJson(err.to_string()),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::InvalidUtf8 => "E_PARSE_UTF8",
            ParseErrorKind::InvalidJson(_) => "E_PARSE_JSON",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
            ParseErrorKind::InvalidJson(message) => write!(f, "invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ParseError {}
