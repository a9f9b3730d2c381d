//! Error handling for the relay.
//!
//! This module provides:
//!
//! - **Error Categories**: High-level classification for recovery decisions
//! - **Domain-specific Errors**: one type per failure class of the pipeline
//! - **Unified Error Type**: `RelayError` consolidates all error types
//! - **Result Type Alias**: `RelayResult<T>` for consistent return types
//!
//! # Recovery policy
//!
//! | Error | Category | Recovery |
//! |-------|----------|----------|
//! | ValidationError | Configuration | fatal at startup |
//! | ConfigError | Configuration | fatal at startup |
//! | NetworkError | Network/Server/Rejected | reconnect after delay |
//! | StreamError | Network | reconnect after delay |
//! | ParseError | Data | skip the line |
//! | ProcessError | varies | fall back to default formatting |
//! | DeliveryError | varies | drop the message, keep relaying |

mod category;
mod config;
mod network;
mod process;
mod relay_error;
mod stream;

pub use category::ErrorCategory;
pub use config::{ConfigError, ValidationError};
pub use network::NetworkError;
pub use process::{Ack, DeliveryError, ProcessError};
pub use relay_error::RelayError;
pub use stream::{ParseError, ParseErrorKind, StreamError};

/// Type alias for Results using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;
