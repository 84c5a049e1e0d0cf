//! Fallback environment: ship events to a sidecar agent.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::config;
use crate::sink::{AgentSink, ConsoleSink, Sink};

use super::{configured_service_name, Environment};

/// Environment used when nothing more specific is detected. Events go to
/// the configured agent endpoint.
pub struct DefaultEnvironment {
    sink: OnceCell<Arc<dyn Sink>>,
}

impl DefaultEnvironment {
    pub fn new() -> Self {
        Self {
            sink: OnceCell::new(),
        }
    }
}

impl Default for DefaultEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for DefaultEnvironment {
    fn probe(&self) -> bool {
        // Unconditional fallback, checked last.
        true
    }

    fn name(&self) -> String {
        configured_service_name(|| "Unknown".to_string())
    }

    fn env_type(&self) -> String {
        "Unknown".to_string()
    }

    fn log_group_name(&self) -> String {
        config()
            .log_group_name
            .clone()
            .unwrap_or_else(|| format!("{}-metrics", self.name()))
    }

    fn sink(&self) -> Arc<dyn Sink> {
        self.sink
            .get_or_init(|| match AgentSink::new(&config().agent_endpoint) {
                Ok(sink) => Arc::new(sink) as Arc<dyn Sink>,
                Err(err) => {
                    tracing::warn!("invalid agent endpoint, falling back to stdout: {err}");
                    Arc::new(ConsoleSink::new()) as Arc<dyn Sink>
                }
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_probes_true() {
        assert!(DefaultEnvironment::new().probe());
    }

    #[test]
    fn test_sink_is_cached() {
        let env = DefaultEnvironment::new();
        let first = env.sink();
        let second = env.sink();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
