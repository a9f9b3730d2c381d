//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `ntfy_relay::adapters::mock` and adds a
//! scripted stream source for supervisor tests.

pub use ntfy_relay::adapters::mock::{MockHttpClient, MockResponse, RecordingSink};
pub use ntfy_relay::traits::{Headers, HttpClient, Response};

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ntfy_relay::error::{NetworkError, ValidationError};
use ntfy_relay::traits::{ByteStream, ConnectError, HttpError, StreamSource};

/// One scripted outcome of [`ScriptedSource::connect`].
pub enum SourceStep {
    /// Yield a stream over this body, then EOF
    Stream(String),
    /// Refuse the connection with this status
    Refuse(u16),
    /// Fail validation
    Invalid,
}

/// A stream source that plays back scripted outcomes.
///
/// Once the script runs out every connect is refused with 503.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<SourceStep>>>,
    connects: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<SourceStep>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

#[async_trait]
impl StreamSource for ScriptedSource {
    async fn connect(&self) -> Result<ByteStream, ConnectError> {
        *self.connects.lock().unwrap() += 1;
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(SourceStep::Stream(body)) => {
                let chunks: Vec<Result<Bytes, HttpError>> = vec![Ok(Bytes::from(body))];
                Ok(Box::pin(futures::stream::iter(chunks)))
            }
            Some(SourceStep::Invalid) => {
                Err(ValidationError::InvalidTopic("bad/topic".to_string()).into())
            }
            Some(SourceStep::Refuse(status)) => Err(NetworkError::HttpStatus {
                status,
                message: String::new(),
            }
            .into()),
            None => Err(NetworkError::HttpStatus {
                status: 503,
                message: String::new(),
            }
            .into()),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
