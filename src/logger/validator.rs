//! Input validation for namespaces, metric names, and dimensions.
//!
//! Violations are reported at the call site so bad input fails the write
//! that caused it instead of poisoning a later flush.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::DimensionSet;
use super::MetricsError;

const MAX_NAMESPACE_LENGTH: usize = 256;
const MAX_METRIC_NAME_LENGTH: usize = 1024;
const MAX_DIMENSION_KEY_LENGTH: usize = 250;
const MAX_DIMENSION_VALUE_LENGTH: usize = 1024;

/// Maximum number of keys in one dimension set.
pub const MAX_DIMENSION_SET_SIZE: usize = 30;

static NAMESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._#:/-]+$").expect("namespace pattern is valid"));

/// Validate a metric namespace.
pub fn validate_namespace(namespace: &str) -> Result<(), MetricsError> {
    if namespace.trim().is_empty() {
        return Err(MetricsError::InvalidNamespace(
            "namespace must not be empty".to_string(),
        ));
    }
    if namespace.len() > MAX_NAMESPACE_LENGTH {
        return Err(MetricsError::InvalidNamespace(format!(
            "namespace exceeds {MAX_NAMESPACE_LENGTH} characters"
        )));
    }
    if !NAMESPACE_PATTERN.is_match(namespace) {
        return Err(MetricsError::InvalidNamespace(format!(
            "namespace '{namespace}' contains invalid characters"
        )));
    }
    Ok(())
}

/// Validate a metric name.
pub fn validate_metric_name(name: &str) -> Result<(), MetricsError> {
    if name.trim().is_empty() {
        return Err(MetricsError::InvalidMetric(
            "metric name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_METRIC_NAME_LENGTH {
        return Err(MetricsError::InvalidMetric(format!(
            "metric name exceeds {MAX_METRIC_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a whole dimension set.
pub fn validate_dimension_set(set: &DimensionSet) -> Result<(), MetricsError> {
    if set.len() > MAX_DIMENSION_SET_SIZE {
        return Err(MetricsError::InvalidDimension(format!(
            "dimension set has {} keys, maximum is {MAX_DIMENSION_SET_SIZE}",
            set.len()
        )));
    }

    for (key, value) in set {
        if key.trim().is_empty() {
            return Err(MetricsError::InvalidDimension(
                "dimension key must not be empty".to_string(),
            ));
        }
        if value.trim().is_empty() {
            return Err(MetricsError::InvalidDimension(format!(
                "dimension '{key}' has an empty value"
            )));
        }
        if key.starts_with(':') {
            return Err(MetricsError::InvalidDimension(format!(
                "dimension key '{key}' must not start with ':'"
            )));
        }
        if key.len() > MAX_DIMENSION_KEY_LENGTH {
            return Err(MetricsError::InvalidDimension(format!(
                "dimension key '{key}' exceeds {MAX_DIMENSION_KEY_LENGTH} characters"
            )));
        }
        if value.len() > MAX_DIMENSION_VALUE_LENGTH {
            return Err(MetricsError::InvalidDimension(format!(
                "dimension '{key}' value exceeds {MAX_DIMENSION_VALUE_LENGTH} characters"
            )));
        }
    }

    Ok(())
}
