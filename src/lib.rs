//! embedmetrics - embedded metrics client
//!
//! Accumulate metrics on a scoped logger and flush them as structured log
//! events in the embedded metric format, so a log pipeline can extract real
//! metrics without a separate metrics transport.
//!
//! The usual entry point is [`metric_scope`]: give it a constructor that
//! receives the scope's logger and returns your handler, and it hands back
//! a wrapped handler with the same calling convention. Every invocation
//! gets a fresh logger and a guaranteed flush, whether the handler
//! succeeded, returned an error, or panicked.
//!
//! ```no_run
//! use embedmetrics::{metric_scope, Unit};
//!
//! # async fn run() {
//! let handler = metric_scope(|metrics| {
//!     move |order_count: u64| async move {
//!         metrics.put_metric("OrdersProcessed", order_count as f64, Unit::Count)?;
//!         metrics.set_property("Source", "nightly-batch");
//!         Ok::<u64, embedmetrics::MetricsError>(order_count)
//!     }
//! });
//!
//! let processed = handler(250).await.unwrap();
//! assert_eq!(processed, 250);
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod logger;
pub mod serializer;
pub mod sink;
pub mod util;

pub use logger::{
    create_metrics_logger, metric_scope, metric_scope_sync, metric_scope_sync_with,
    metric_scope_with, DimensionSet, MetricsError, MetricsLogger, Unit,
};
