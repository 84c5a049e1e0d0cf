//! Embedded-metric-format serialization.
//!
//! One context serializes to one or more single-line JSON documents. Each
//! document carries the metric metadata under `_aws` and the dimension
//! values, properties, and metric values flattened at the root, which is
//! the shape log pipelines extract metrics from. Oversized contexts spill
//! into additional documents: at most 100 metric definitions per document
//! and at most 100 values per metric per document.

use std::collections::VecDeque;

use serde_json::{json, Map, Value};

use crate::logger::context::{
    DimensionSet, MetricsContext, MAX_METRICS_PER_EVENT, MAX_VALUES_PER_METRIC,
};
use crate::logger::unit::Unit;
use crate::logger::MetricsError;

/// Serialize a context into event strings. A context without metrics still
/// produces one event so properties and dimensions are not lost.
pub fn serialize(context: &MetricsContext) -> Result<Vec<String>, MetricsError> {
    let dimension_sets = context.resolved_dimensions();

    if !context.has_metrics() {
        return Ok(vec![render_event(context, &dimension_sets, &[])?]);
    }

    let mut pending: VecDeque<(&str, Unit, &[f64])> = context
        .metrics()
        .iter()
        .map(|(name, metric)| (name.as_str(), metric.unit, metric.values.as_slice()))
        .collect();

    let mut events = Vec::new();
    while !pending.is_empty() {
        let mut batch: Vec<(&str, Unit, &[f64])> = Vec::new();
        let mut carry: Vec<(&str, Unit, &[f64])> = Vec::new();

        while batch.len() < MAX_METRICS_PER_EVENT {
            let Some((name, unit, values)) = pending.pop_front() else {
                break;
            };
            let split = values.len().min(MAX_VALUES_PER_METRIC);
            let (chunk, rest) = values.split_at(split);
            batch.push((name, unit, chunk));
            if !rest.is_empty() {
                carry.push((name, unit, rest));
            }
        }

        // Leftover values are retried at the front of the next event.
        for entry in carry.into_iter().rev() {
            pending.push_front(entry);
        }

        events.push(render_event(context, &dimension_sets, &batch)?);
    }

    Ok(events)
}

fn render_event(
    context: &MetricsContext,
    dimension_sets: &[DimensionSet],
    batch: &[(&str, Unit, &[f64])],
) -> Result<String, MetricsError> {
    let mut root = Map::new();

    for set in dimension_sets {
        for (key, value) in set {
            root.insert(key.clone(), Value::String(value.clone()));
        }
    }

    for (key, value) in context.properties() {
        root.insert(key.clone(), value.clone());
    }

    for (name, _unit, values) in batch {
        let value = if values.len() == 1 {
            json!(values[0])
        } else {
            json!(values)
        };
        root.insert((*name).to_string(), value);
    }

    let dimension_keys: Vec<Value> = dimension_sets
        .iter()
        .map(|set| Value::Array(set.keys().cloned().map(Value::String).collect()))
        .collect();

    let metric_definitions: Vec<Value> = batch
        .iter()
        .map(|(name, unit, _)| json!({ "Name": name, "Unit": unit }))
        .collect();

    root.insert(
        "_aws".to_string(),
        json!({
            "Timestamp": context.timestamp_millis(),
            "CloudWatchMetrics": [{
                "Namespace": context.namespace(),
                "Dimensions": dimension_keys,
                "Metrics": metric_definitions,
            }],
        }),
    );

    Ok(serde_json::to_string(&Value::Object(root))?)
}
