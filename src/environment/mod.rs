//! Execution-environment detection.
//!
//! The environment decides where serialized events go and which default
//! dimensions and run-context properties are stamped onto a context at
//! flush time. Detection runs once per process; `EMF_ENVIRONMENT` skips it
//! entirely.

mod default;
mod lambda;
mod local;

pub use default::DefaultEnvironment;
pub use lambda::LambdaEnvironment;
pub use local::LocalEnvironment;

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::{config, EnvironmentOverride};
use crate::logger::context::MetricsContext;
use crate::sink::Sink;

/// Interface for execution environments
pub trait Environment: Send + Sync {
    /// Whether this environment matches the current process.
    fn probe(&self) -> bool;

    /// Service name used for the `ServiceName` default dimension.
    fn name(&self) -> String;

    /// Environment type used for the `ServiceType` default dimension.
    fn env_type(&self) -> String;

    /// Log group the events are addressed to.
    fn log_group_name(&self) -> String;

    /// Attach run-context properties before serialization.
    fn configure_context(&self, _context: &mut MetricsContext) {}

    /// Sink that delivers this environment's events.
    fn sink(&self) -> Arc<dyn Sink>;
}

static RESOLVED: Lazy<Arc<dyn Environment>> = Lazy::new(detect);

/// The process-wide environment, detected on first use.
pub fn resolve_environment() -> Arc<dyn Environment> {
    RESOLVED.clone()
}

fn detect() -> Arc<dyn Environment> {
    if let Some(forced) = config().environment_override {
        tracing::debug!(?forced, "environment detection skipped by override");
        return match forced {
            EnvironmentOverride::Local => Arc::new(LocalEnvironment::new()),
            EnvironmentOverride::Lambda => Arc::new(LambdaEnvironment::new()),
            EnvironmentOverride::Agent => Arc::new(DefaultEnvironment::new()),
        };
    }

    let lambda = LambdaEnvironment::new();
    if lambda.probe() {
        return Arc::new(lambda);
    }

    Arc::new(DefaultEnvironment::new())
}

/// Service name from config, or the given fallback.
fn configured_service_name(fallback: impl FnOnce() -> String) -> String {
    config().service_name.clone().unwrap_or_else(fallback)
}
