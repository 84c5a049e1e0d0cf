//! Delivery sinks for serialized metric events.
//!
//! A sink receives fully serialized event strings and gets them to wherever
//! the log pipeline picks them up: stdout for function runtimes and local
//! development, a sidecar agent socket for everything else.

mod agent;
mod console;

pub use agent::AgentSink;
pub use console::ConsoleSink;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering events
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Unsupported endpoint: {0}")]
    UnsupportedEndpoint(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Interface for event delivery backends
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver a batch of serialized events.
    async fn accept(&self, events: &[String]) -> Result<(), SinkError>;

    /// Sink name for diagnostics.
    fn name(&self) -> &'static str;
}
