//! Lambda-style function runtime environment.
//!
//! Function runtimes already pipe stdout into the log service, so events go
//! to the console sink, and the runtime's well-known variables become
//! run-context properties on every event.

use std::sync::Arc;

use serde_json::Value;

use crate::logger::context::MetricsContext;
use crate::sink::{ConsoleSink, Sink};

use super::{configured_service_name, Environment};

const FUNCTION_NAME_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";
const LOG_GROUP_VAR: &str = "AWS_LAMBDA_LOG_GROUP_NAME";
const LOG_STREAM_VAR: &str = "AWS_LAMBDA_LOG_STREAM_NAME";
const FUNCTION_VERSION_VAR: &str = "AWS_LAMBDA_FUNCTION_VERSION";
const MEMORY_SIZE_VAR: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
const EXECUTION_ENV_VAR: &str = "AWS_EXECUTION_ENV";
const TRACE_HEADER_VAR: &str = "_X_AMZN_TRACE_ID";

/// Function runtime environment, detected through the runtime's own
/// environment variables.
pub struct LambdaEnvironment {
    sink: Arc<ConsoleSink>,
}

impl LambdaEnvironment {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(ConsoleSink::new()),
        }
    }

    fn function_name() -> Option<String> {
        std::env::var(FUNCTION_NAME_VAR)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn sampled_trace_id() -> Option<String> {
        let header = std::env::var(TRACE_HEADER_VAR).ok()?;
        if header.contains("Sampled=1") {
            Some(header)
        } else {
            None
        }
    }
}

impl Default for LambdaEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for LambdaEnvironment {
    fn probe(&self) -> bool {
        Self::function_name().is_some()
    }

    fn name(&self) -> String {
        configured_service_name(|| Self::function_name().unwrap_or_else(|| "Unknown".to_string()))
    }

    fn env_type(&self) -> String {
        "AWS::Lambda::Function".to_string()
    }

    fn log_group_name(&self) -> String {
        std::env::var(LOG_GROUP_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(Self::function_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn configure_context(&self, context: &mut MetricsContext) {
        set_env_property(context, "executionEnvironment", EXECUTION_ENV_VAR);
        set_env_property(context, "memorySize", MEMORY_SIZE_VAR);
        set_env_property(context, "functionVersion", FUNCTION_VERSION_VAR);
        set_env_property(context, "logStreamId", LOG_STREAM_VAR);

        if let Some(trace_id) = Self::sampled_trace_id() {
            context.set_property("xrayTraceId", Value::from(trace_id));
        }
    }

    fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }
}

fn set_env_property(context: &mut MetricsContext, name: &str, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            context.set_property(name, Value::from(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment-variable tests share process state, so each one uses its
    // own variables and cleans up after itself.

    #[test]
    fn test_probe_follows_function_name() {
        std::env::remove_var(FUNCTION_NAME_VAR);
        assert!(!LambdaEnvironment::new().probe());

        std::env::set_var(FUNCTION_NAME_VAR, "my-function");
        assert!(LambdaEnvironment::new().probe());
        std::env::remove_var(FUNCTION_NAME_VAR);
    }

    #[test]
    fn test_configure_context_attaches_runtime_properties() {
        std::env::set_var(FUNCTION_VERSION_VAR, "$LATEST");
        std::env::set_var(MEMORY_SIZE_VAR, "128");

        let env = LambdaEnvironment::new();
        let mut context = MetricsContext::new();
        env.configure_context(&mut context);

        assert_eq!(context.properties()["functionVersion"], "$LATEST");
        assert_eq!(context.properties()["memorySize"], "128");

        std::env::remove_var(FUNCTION_VERSION_VAR);
        std::env::remove_var(MEMORY_SIZE_VAR);
    }

    #[test]
    fn test_unsampled_trace_is_not_attached() {
        std::env::set_var(TRACE_HEADER_VAR, "Root=1-abc;Sampled=0");

        let env = LambdaEnvironment::new();
        let mut context = MetricsContext::new();
        env.configure_context(&mut context);

        assert!(!context.properties().contains_key("xrayTraceId"));
        std::env::remove_var(TRACE_HEADER_VAR);
    }

    #[test]
    fn test_env_type() {
        assert_eq!(LambdaEnvironment::new().env_type(), "AWS::Lambda::Function");
    }
}
