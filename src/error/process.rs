//! Post-processing and delivery errors.
//!
//! Neither is fatal. A [`ProcessError`] makes the pipeline fall back to the
//! default formatter; a [`DeliveryError`] drops the one message it concerns.

use thiserror::Error;

use crate::traits::HttpError;

/// A post-processor could not turn an event into outbound text.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    #[error("failed to execute template: {0}")]
    Render(String),

    #[error("failed to marshal message: {0}")]
    Serialize(String),

    #[error("webhook request failed: {0}")]
    Request(HttpError),

    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("webhook failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<ProcessError>,
    },
}

impl ProcessError {
    /// Whether another attempt of the same request may succeed.
    ///
    /// 4xx is final, including 429.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProcessError::Request(_) => true,
            ProcessError::Status { status, .. } => !(400..500).contains(status),
            ProcessError::Render(_) | ProcessError::Serialize(_) => false,
            ProcessError::Exhausted { .. } => false,
        }
    }

    /// Status code of the failure, looking through [`ProcessError::Exhausted`].
    pub fn status(&self) -> Option<u16> {
        match self {
            ProcessError::Status { status, .. } => Some(*status),
            ProcessError::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ProcessError::Render(_) => "E_PROC_RENDER",
            ProcessError::Serialize(_) => "E_PROC_SERIALIZE",
            ProcessError::Request(_) => "E_PROC_REQUEST",
            ProcessError::Status { .. } => "E_PROC_STATUS",
            ProcessError::Exhausted { .. } => "E_PROC_EXHAUSTED",
        }
    }
}

/// Acknowledgement of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}

/// The sink did not accept a message.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("message is nil")]
    MissingMessage,

    #[error("failed to encode message: {0}")]
    Serialize(String),

    #[error("sink request failed: {0}")]
    Request(HttpError),

    #[error("error status code {status}")]
    Status { status: u16 },
}

impl DeliveryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DeliveryError::MissingMessage => "E_DLV_MISSING",
            DeliveryError::Serialize(_) => "E_DLV_SERIALIZE",
            DeliveryError::Request(_) => "E_DLV_REQUEST",
            DeliveryError::Status { .. } => "E_DLV_STATUS",
        }
    }
}
