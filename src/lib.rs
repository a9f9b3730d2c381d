//! ntfy-relay - Relays an ntfy notification stream to a Slack-compatible webhook
//!
//! This library exposes modules for use by the binary and integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod ntfy;
pub mod postprocess;
pub mod relay;
pub mod sink;
pub mod traits;
