//! Accumulation state for one metric scope.
//!
//! A context holds everything one flush will serialize: namespace,
//! properties, dimension sets, and the metric value directory. `BTreeMap`
//! storage keeps serialization order deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::config;

use super::unit::Unit;
use super::validator;
use super::MetricsError;

/// Maximum number of metric definitions one serialized event may carry.
pub const MAX_METRICS_PER_EVENT: usize = 100;

/// Maximum number of values one metric may carry per serialized event.
pub const MAX_VALUES_PER_METRIC: usize = 100;

/// One set of dimension key/value pairs.
pub type DimensionSet = BTreeMap<String, String>;

/// Values accumulated for a single metric name.
#[derive(Debug, Clone)]
pub struct MetricValues {
    pub values: Vec<f64>,
    pub unit: Unit,
}

/// Mutable accumulation state for one scope.
#[derive(Debug, Clone)]
pub struct MetricsContext {
    namespace: String,
    properties: BTreeMap<String, Value>,
    default_dimensions: DimensionSet,
    dimensions: Vec<DimensionSet>,
    use_default_dimensions: bool,
    metrics: BTreeMap<String, MetricValues>,
    timestamp: DateTime<Utc>,
}

impl MetricsContext {
    /// Create an empty context stamped with the current time and the
    /// configured namespace.
    pub fn new() -> Self {
        Self {
            namespace: config().namespace.clone(),
            properties: BTreeMap::new(),
            default_dimensions: DimensionSet::new(),
            dimensions: Vec::new(),
            use_default_dimensions: true,
            metrics: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Successor context after a flush: namespace, properties, and default
    /// dimensions carry over; metrics, custom dimensions, and the timestamp
    /// start fresh.
    pub fn copy_base(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            properties: self.properties.clone(),
            default_dimensions: self.default_dimensions.clone(),
            dimensions: Vec::new(),
            use_default_dimensions: self.use_default_dimensions,
            metrics: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Override the namespace for this context.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> Result<(), MetricsError> {
        let namespace = namespace.into();
        validator::validate_namespace(&namespace)?;
        self.namespace = namespace;
        Ok(())
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Attach a property emitted on every event of this context.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    /// Replace the default dimensions. Called at flush time with the
    /// environment's LogGroup/ServiceName/ServiceType set.
    pub fn set_default_dimensions(&mut self, dimensions: DimensionSet) {
        self.default_dimensions = dimensions;
    }

    /// Add a dimension set. A set with the same keys as an existing one
    /// replaces it, so repeated calls do not duplicate series.
    pub fn put_dimensions(&mut self, dimensions: DimensionSet) -> Result<(), MetricsError> {
        validator::validate_dimension_set(&dimensions)?;

        let incoming_keys: Vec<&String> = dimensions.keys().collect();
        self.dimensions
            .retain(|set| set.keys().collect::<Vec<_>>() != incoming_keys);
        self.dimensions.push(dimensions);
        Ok(())
    }

    /// Replace all custom dimension sets. When `use_default` is false the
    /// environment's default dimensions are dropped from the output as well.
    pub fn set_dimensions(
        &mut self,
        dimension_sets: Vec<DimensionSet>,
        use_default: bool,
    ) -> Result<(), MetricsError> {
        for set in &dimension_sets {
            validator::validate_dimension_set(set)?;
        }
        self.dimensions = dimension_sets;
        self.use_default_dimensions = use_default;
        Ok(())
    }

    /// Record one value for a metric. Repeated calls with the same name
    /// accumulate values; the unit of the first call wins.
    pub fn put_metric(
        &mut self,
        name: impl Into<String>,
        value: f64,
        unit: Unit,
    ) -> Result<(), MetricsError> {
        let name = name.into();
        validator::validate_metric_name(&name)?;

        self.metrics
            .entry(name)
            .and_modify(|entry| entry.values.push(value))
            .or_insert_with(|| MetricValues {
                values: vec![value],
                unit,
            });
        Ok(())
    }

    pub fn metrics(&self) -> &BTreeMap<String, MetricValues> {
        &self.metrics
    }

    pub fn has_metrics(&self) -> bool {
        !self.metrics.is_empty()
    }

    /// Dimension sets as they will be serialized: custom sets merged over
    /// the defaults, or the defaults alone when no custom set exists.
    pub fn resolved_dimensions(&self) -> Vec<DimensionSet> {
        if !self.use_default_dimensions {
            return self.dimensions.clone();
        }

        if self.dimensions.is_empty() {
            if self.default_dimensions.is_empty() {
                return Vec::new();
            }
            return vec![self.default_dimensions.clone()];
        }

        self.dimensions
            .iter()
            .map(|custom| {
                let mut merged = self.default_dimensions.clone();
                merged.extend(custom.clone());
                merged
            })
            .collect()
    }
}

impl Default for MetricsContext {
    fn default() -> Self {
        Self::new()
    }
}
