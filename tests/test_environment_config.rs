//! Tests for the `EMF_*` configuration flowing through the flush pipeline
//! and the environment resolver.
//!
//! The configuration and the resolved environment are process-wide, loaded
//! on first use. This binary pins them through environment variables before
//! any test touches the library, so it must stay separate from the other
//! integration suites.

mod common;

use std::sync::Once;

use embedmetrics::{metric_scope, metric_scope_sync, Unit};
use serde_json::Value;

use common::{test_logger, MemorySink};

static SETUP: Once = Once::new();

/// Every test calls this first, so the variables are in place before the
/// process-wide config or environment can load.
fn configure_process() {
    SETUP.call_once(|| {
        std::env::set_var("EMF_ENVIRONMENT", "local");
        std::env::set_var("EMF_SERVICE_NAME", "orders");
        std::env::set_var("EMF_SERVICE_TYPE", "Worker");
        std::env::set_var("EMF_LOG_STREAM_NAME", "orders-stream-1");
    });
}

#[tokio::test]
async fn test_configured_service_overrides_reach_the_event() {
    configure_process();
    let sink = MemorySink::new();
    let logger = test_logger(sink.clone());

    logger.put_metric("Latency", 7.0, Unit::Milliseconds).unwrap();
    logger.flush().await.unwrap();

    let body: Value = serde_json::from_str(&sink.captured()[0]).unwrap();
    // Configured name and type win over what the environment reports.
    assert_eq!(body["ServiceName"], "orders");
    assert_eq!(body["ServiceType"], "Worker");
    assert_eq!(body["LogStreamName"], "orders-stream-1");
    assert_eq!(
        body["_aws"]["CloudWatchMetrics"][0]["Dimensions"],
        serde_json::json!([["LogGroup", "ServiceName", "ServiceType"]])
    );
}

#[tokio::test]
async fn test_default_async_scope_runs_against_detected_environment() {
    configure_process();
    let handler = metric_scope(|metrics| {
        move |n: u64| async move {
            metrics.put_metric("Handled", n as f64, Unit::Count)?;
            Ok::<u64, embedmetrics::MetricsError>(n * 2)
        }
    });

    // `EMF_ENVIRONMENT=local` routes the flush to stdout, so the value
    // coming back is the observable part.
    assert_eq!(handler(21).await.unwrap(), 42);
}

#[tokio::test]
async fn test_default_sync_scope_runs_against_detected_environment() {
    configure_process();
    let handler = metric_scope_sync(|metrics| {
        move |label: String| {
            metrics.set_property("Label", label.clone());
            label
        }
    });

    assert_eq!(handler("done".to_string()).await, "done");
}
