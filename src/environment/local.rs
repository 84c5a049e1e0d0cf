//! Local development environment: events go straight to stdout.

use std::sync::Arc;

use crate::config::config;
use crate::sink::{ConsoleSink, Sink};

use super::{configured_service_name, Environment};

/// Environment for local development. Never self-detects; selected only via
/// the `EMF_ENVIRONMENT=local` override.
pub struct LocalEnvironment {
    sink: Arc<ConsoleSink>,
}

impl LocalEnvironment {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(ConsoleSink::new()),
        }
    }
}

impl Default for LocalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for LocalEnvironment {
    fn probe(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        configured_service_name(|| "Unknown".to_string())
    }

    fn env_type(&self) -> String {
        "Local".to_string()
    }

    fn log_group_name(&self) -> String {
        config()
            .log_group_name
            .clone()
            .unwrap_or_else(|| format!("{}-metrics", self.name()))
    }

    fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }
}
