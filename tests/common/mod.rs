//! Shared fixtures for embedmetrics integration tests.

// Fixtures are shared across test binaries; not every binary uses every
// helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use embedmetrics::environment::Environment;
use embedmetrics::sink::{Sink, SinkError};
use embedmetrics::MetricsLogger;

static TRACING: Once = Once::new();

/// Route tracing output through the test harness, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Sink that captures events in memory and counts accept calls.
pub struct MemorySink {
    pub events: Mutex<Vec<String>>,
    pub accepts: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            accepts: AtomicUsize::new(0),
        })
    }

    /// Number of accept calls so far.
    pub fn accept_count(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }

    /// All captured events, in arrival order.
    pub fn captured(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn accept(&self, events: &[String]) -> Result<(), SinkError> {
        self.accepts.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Sink whose accept always fails, for flush-failure policy tests.
pub struct FailingSink {
    pub accepts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accepts: AtomicUsize::new(0),
        })
    }

    pub fn accept_count(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sink for FailingSink {
    async fn accept(&self, _events: &[String]) -> Result<(), SinkError> {
        self.accepts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Connection("synthetic failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Environment bound to a caller-controlled sink.
pub struct TestEnvironment {
    sink: Arc<dyn Sink>,
}

impl TestEnvironment {
    pub fn new(sink: Arc<dyn Sink>) -> Arc<Self> {
        Arc::new(Self { sink })
    }
}

impl Environment for TestEnvironment {
    fn probe(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        "test-service".to_string()
    }

    fn env_type(&self) -> String {
        "Test".to_string()
    }

    fn log_group_name(&self) -> String {
        "test-service-metrics".to_string()
    }

    fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }
}

/// Logger bound to the given sink through a test environment.
pub fn test_logger(sink: Arc<dyn Sink>) -> MetricsLogger {
    MetricsLogger::new(TestEnvironment::new(sink))
}

/// Logger factory for `metric_scope_with`, bound to the given sink.
pub fn test_factory(sink: Arc<dyn Sink>) -> impl Fn() -> MetricsLogger {
    move || test_logger(sink.clone())
}
