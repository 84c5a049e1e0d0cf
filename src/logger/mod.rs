//! Metrics logger: per-scope accumulation and flush.
//!
//! A [`MetricsLogger`] is a cheap-to-clone handle over one scope's
//! accumulation state. Writes are synchronous; only [`MetricsLogger::flush`]
//! is async, while the serialized events travel to the environment's sink.

pub mod context;
pub mod scope;
pub mod unit;
pub mod validator;

pub use context::{DimensionSet, MetricsContext};
pub use scope::{metric_scope, metric_scope_sync, metric_scope_sync_with, metric_scope_with};
pub use unit::Unit;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::config::config;
use crate::environment::{resolve_environment, Environment};
use crate::serializer;
use crate::sink::SinkError;

/// Errors that can occur while recording or flushing metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Create a logger bound to the detected execution environment.
///
/// This is the logger factory the scope wrapper uses; each call produces an
/// independent logger with a fresh context.
pub fn create_metrics_logger() -> MetricsLogger {
    MetricsLogger::new(resolve_environment())
}

/// Handle over one scope's metric accumulation state.
///
/// Clones share the same context, which is what lets the scope wrapper keep
/// a flush handle while the handler owns its own copy.
#[derive(Clone)]
pub struct MetricsLogger {
    context: Arc<Mutex<MetricsContext>>,
    environment: Arc<dyn Environment>,
}

impl MetricsLogger {
    /// Create a logger bound to an explicit environment.
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self {
            context: Arc::new(Mutex::new(MetricsContext::new())),
            environment,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsContext> {
        self.context.lock().expect("mutex poisoned")
    }

    /// Record one value for a metric.
    pub fn put_metric(
        &self,
        name: impl Into<String>,
        value: f64,
        unit: Unit,
    ) -> Result<(), MetricsError> {
        self.lock().put_metric(name, value, unit)
    }

    /// Attach a property to the emitted events.
    pub fn set_property(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.lock().set_property(name, value.into());
    }

    /// Add a dimension set alongside the environment defaults.
    pub fn put_dimensions(&self, dimensions: DimensionSet) -> Result<(), MetricsError> {
        self.lock().put_dimensions(dimensions)
    }

    /// Replace all dimension sets. `use_default` keeps or drops the
    /// environment's default dimensions.
    pub fn set_dimensions(
        &self,
        dimension_sets: Vec<DimensionSet>,
        use_default: bool,
    ) -> Result<(), MetricsError> {
        self.lock().set_dimensions(dimension_sets, use_default)
    }

    /// Override the namespace.
    pub fn set_namespace(&self, namespace: impl Into<String>) -> Result<(), MetricsError> {
        self.lock().set_namespace(namespace)
    }

    /// Override the event timestamp.
    pub fn set_timestamp(&self, timestamp: DateTime<Utc>) {
        self.lock().set_timestamp(timestamp);
    }

    /// Serialize the accumulated state and hand it to the environment's
    /// sink, then reset the context for reuse.
    ///
    /// Namespace, properties, and default dimensions survive the reset;
    /// metric values and custom dimension sets do not.
    pub async fn flush(&self) -> Result<(), MetricsError> {
        let snapshot = {
            let mut context = self.lock();
            self.stamp_default_dimensions(&mut context);
            // Agents route on this root key when a stream is configured.
            if let Some(stream) = &config().log_stream_name {
                context.set_property("LogStreamName", Value::from(stream.clone()));
            }
            self.environment.configure_context(&mut context);
            let next = context.copy_base();
            std::mem::replace(&mut *context, next)
        };

        let events = serializer::serialize(&snapshot)?;
        let sink = self.environment.sink();
        tracing::debug!(sink = sink.name(), events = events.len(), "flushing metrics");
        sink.accept(&events).await?;
        Ok(())
    }

    /// Configured service name/type take precedence over what the
    /// environment reports.
    fn stamp_default_dimensions(&self, context: &mut MetricsContext) {
        let cfg = config();
        let mut defaults = DimensionSet::new();
        defaults.insert("LogGroup".to_string(), self.environment.log_group_name());
        defaults.insert(
            "ServiceName".to_string(),
            cfg.service_name
                .clone()
                .unwrap_or_else(|| self.environment.name()),
        );
        defaults.insert(
            "ServiceType".to_string(),
            cfg.service_type
                .clone()
                .unwrap_or_else(|| self.environment.env_type()),
        );
        context.set_default_dimensions(defaults);
    }
}
