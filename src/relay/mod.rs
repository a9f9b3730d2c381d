//! The relay loop: a per-connection pipeline driven by a reconnect supervisor.

pub mod pipeline;
pub mod supervisor;

pub use pipeline::{ConnectionOutcome, RelayPipeline};
pub use supervisor::{Supervisor, SupervisorState, DEFAULT_RECONNECT_DELAY};
