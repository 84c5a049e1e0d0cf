//! Scope wrapper: bracket a handler with logger creation and a guaranteed
//! flush.
//!
//! [`metric_scope`] takes a constructor that receives a [`MetricsLogger`]
//! and returns the actual handler. The wrapped handler it produces has the
//! same calling convention but always returns a future, and every
//! invocation opens its own scope: one fresh logger going in, exactly one
//! flush on the way out, whether the handler returned a value, returned an
//! error through its own result type, or panicked.
//!
//! Handlers that take more than one argument take them as a tuple:
//!
//! ```no_run
//! use embedmetrics::{metric_scope, Unit};
//!
//! # async fn run() {
//! let handler = metric_scope(|metrics| {
//!     move |(region, count): (String, u64)| async move {
//!         metrics.put_metric("Processed", count as f64, Unit::Count)?;
//!         metrics.set_property("Region", region);
//!         Ok::<(), embedmetrics::MetricsError>(())
//!     }
//! });
//!
//! handler(("us-west-2".to_string(), 12)).await.unwrap();
//! handler(("eu-west-1".to_string(), 3)).await.unwrap();
//! # }
//! ```

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{create_metrics_logger, MetricsLogger};

/// Wrap an async handler in a metric scope.
///
/// `constructor` is called once per invocation with that invocation's
/// logger and returns the handler to run. The constructor runs before the
/// scope opens, so a panic inside it propagates without a flush attempt.
pub fn metric_scope<C, H, Fut, A, T>(constructor: C) -> impl Fn(A) -> BoxFuture<'static, T>
where
    C: Fn(MetricsLogger) -> H,
    H: FnOnce(A) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    metric_scope_with(create_metrics_logger, constructor)
}

/// Wrap a synchronous handler in a metric scope.
///
/// The wrapped form still returns a future so call sites can await it
/// uniformly; the flush happens before that future resolves.
pub fn metric_scope_sync<C, H, A, T>(constructor: C) -> impl Fn(A) -> BoxFuture<'static, T>
where
    C: Fn(MetricsLogger) -> H,
    H: FnOnce(A) -> T + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    metric_scope_sync_with(create_metrics_logger, constructor)
}

/// [`metric_scope`] with a caller-supplied logger factory.
///
/// Tests substitute a factory whose loggers are bound to a controllable
/// environment instead of the detected one.
pub fn metric_scope_with<L, C, H, Fut, A, T>(
    factory: L,
    constructor: C,
) -> impl Fn(A) -> BoxFuture<'static, T>
where
    L: Fn() -> MetricsLogger,
    C: Fn(MetricsLogger) -> H,
    H: FnOnce(A) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    move |args| {
        let logger = factory();
        let handler = constructor(logger.clone());
        async move {
            let outcome = AssertUnwindSafe(async move { handler(args).await })
                .catch_unwind()
                .await;
            flush_scope(&logger).await;
            settle(outcome)
        }
        .boxed()
    }
}

/// [`metric_scope_sync`] with a caller-supplied logger factory.
pub fn metric_scope_sync_with<L, C, H, A, T>(
    factory: L,
    constructor: C,
) -> impl Fn(A) -> BoxFuture<'static, T>
where
    L: Fn() -> MetricsLogger,
    C: Fn(MetricsLogger) -> H,
    H: FnOnce(A) -> T + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    move |args| {
        let logger = factory();
        let handler = constructor(logger.clone());
        async move {
            let outcome = panic::catch_unwind(AssertUnwindSafe(move || handler(args)));
            flush_scope(&logger).await;
            settle(outcome)
        }
        .boxed()
    }
}

/// Flush at scope exit. The handler's outcome always wins: a flush failure
/// is reported through tracing and never replaces it.
async fn flush_scope(logger: &MetricsLogger) {
    if let Err(err) = logger.flush().await {
        tracing::warn!("metrics flush failed at scope exit: {err}");
    }
}

/// Re-deliver the handler's outcome unchanged, resuming the unwind if the
/// handler panicked.
fn settle<T>(outcome: Result<T, Box<dyn std::any::Any + Send>>) -> T {
    match outcome {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}
