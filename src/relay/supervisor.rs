//! Reconnect supervisor.
//!
//! A two-state machine: `Connecting` acquires a stream from the source,
//! `Relaying` hands it to the pipeline. Any end of a stream, and any failed
//! connection attempt, leads back to `Connecting` after a fixed delay. Only a
//! validation failure ends the loop.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::pipeline::{ConnectionOutcome, RelayPipeline};
use crate::error::RelayError;
use crate::traits::{ByteStream, ConnectError, StreamSource};

/// Delay before every reconnect.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(30);

pub enum SupervisorState {
    Connecting,
    Relaying(ByteStream),
}

impl SupervisorState {
    pub fn is_connecting(&self) -> bool {
        matches!(self, SupervisorState::Connecting)
    }
}

impl fmt::Debug for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Connecting => write!(f, "Connecting"),
            SupervisorState::Relaying(_) => write!(f, "Relaying(..)"),
        }
    }
}

pub struct Supervisor {
    source: Arc<dyn StreamSource>,
    pipeline: RelayPipeline,
    reconnect_delay: Duration,
}

impl Supervisor {
    pub fn new(source: Arc<dyn StreamSource>, pipeline: RelayPipeline) -> Self {
        Self {
            source,
            pipeline,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Perform exactly one transition.
    pub async fn step(&self, state: SupervisorState) -> Result<SupervisorState, RelayError> {
        match state {
            SupervisorState::Connecting => match self.source.connect().await {
                Ok(stream) => Ok(SupervisorState::Relaying(stream)),
                Err(ConnectError::Validation(err)) => {
                    tracing::error!(
                        source = %self.source.describe(),
                        error = %err,
                        code = err.error_code(),
                        "Invalid connection parameters"
                    );
                    Err(err.into())
                }
                Err(ConnectError::Connection(err)) => {
                    tracing::error!(
                        source = %self.source.describe(),
                        status = ?err.status(),
                        error = %err,
                        code = err.error_code(),
                        "Failed to connect to ntfy"
                    );
                    self.wait_before_reconnect().await;
                    Ok(SupervisorState::Connecting)
                }
            },
            SupervisorState::Relaying(stream) => {
                match self.pipeline.run(stream).await {
                    ConnectionOutcome::Eof => {
                        tracing::info!(source = %self.source.describe(), "Connection closed");
                    }
                    ConnectionOutcome::ReadError(err) => {
                        tracing::warn!(
                            source = %self.source.describe(),
                            error = %err,
                            code = err.error_code(),
                            "Connection lost"
                        );
                    }
                }
                self.wait_before_reconnect().await;
                Ok(SupervisorState::Connecting)
            }
        }
    }

    /// Loop over [`step`](Self::step) until a fatal error.
    pub async fn run(&self) -> Result<Infallible, RelayError> {
        tracing::info!(
            source = %self.source.describe(),
            processor = self.pipeline.processor_name(),
            "Starting relay"
        );
        let mut state = SupervisorState::Connecting;
        loop {
            state = self.step(state).await?;
        }
    }

    async fn wait_before_reconnect(&self) {
        tracing::info!(
            delay_secs = self.reconnect_delay.as_secs(),
            "Reconnecting after delay"
        );
        tokio::time::sleep(self.reconnect_delay).await;
    }
}
