//! Runtime configuration for the metrics client.
//!
//! Every setting can be supplied through an `EMF_`-prefixed environment
//! variable; unset variables fall back to defaults that work for local
//! development. The process-wide instance is loaded once and read through
//! [`config()`]. Tests that need custom settings construct [`Config`]
//! directly instead of mutating the process environment.

use once_cell::sync::Lazy;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "embedded-metrics";

/// Agent endpoint used when none is configured.
pub const DEFAULT_AGENT_ENDPOINT: &str = "tcp://127.0.0.1:25888";

/// Forced environment selection, bypassing detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentOverride {
    /// Local development: events go to stdout.
    Local,
    /// Lambda-style function runtime: events go to stdout with run-context
    /// properties attached.
    Lambda,
    /// Sidecar agent: events go to the configured TCP/UDP endpoint.
    Agent,
}

impl EnvironmentOverride {
    /// Parse an override name, case-insensitively. Unknown names are `None`
    /// so that a typo falls back to detection rather than aborting.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "lambda" => Some(Self::Lambda),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace metrics are published under.
    pub namespace: String,
    /// Service name for the `ServiceName` default dimension.
    pub service_name: Option<String>,
    /// Service type for the `ServiceType` default dimension.
    pub service_type: Option<String>,
    /// Log group events are addressed to.
    pub log_group_name: Option<String>,
    /// Log stream events are addressed to.
    pub log_stream_name: Option<String>,
    /// Agent endpoint URI, `tcp://host:port` or `udp://host:port`.
    pub agent_endpoint: String,
    /// Forced environment, bypassing detection.
    pub environment_override: Option<EnvironmentOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            service_name: None,
            service_type: None,
            log_group_name: None,
            log_stream_name: None,
            agent_endpoint: DEFAULT_AGENT_ENDPOINT.to_string(),
            environment_override: None,
        }
    }
}

impl Config {
    /// Load configuration from `EMF_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            namespace: env_var("EMF_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            service_name: env_var("EMF_SERVICE_NAME"),
            service_type: env_var("EMF_SERVICE_TYPE"),
            log_group_name: env_var("EMF_LOG_GROUP_NAME"),
            log_stream_name: env_var("EMF_LOG_STREAM_NAME"),
            agent_endpoint: env_var("EMF_AGENT_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AGENT_ENDPOINT.to_string()),
            environment_override: env_var("EMF_ENVIRONMENT")
                .and_then(|v| EnvironmentOverride::parse(&v)),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Process-wide configuration, loaded on first access.
pub fn config() -> &'static Config {
    &GLOBAL_CONFIG
}
