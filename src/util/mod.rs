//! Utility functions and helpers

pub mod retry;

pub use retry::{retry_with_backoff, RetryOptions};
