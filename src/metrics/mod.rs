/*!
 * # Metrics Module
 *
 * Lightweight in-process metrics for the workflow engine, exported in
 * Prometheus text format at `/metrics`.
 *
 * Metric keys may carry labels (`name{kind="transfer"}`); the exporter groups
 * them under a single `# TYPE` line per metric family.
 */

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::entities::workflow_document::WorkflowKind;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge holding an `f64` stored as raw bits.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    bits: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Count/sum histogram (no buckets).
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_bits: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        use std::fmt::Write;

        let mut families: BTreeMap<String, (&'static str, Vec<String>)> = BTreeMap::new();
        let mut push = |key: &str, kind: &'static str, lines: Vec<String>| {
            families
                .entry(family_name(key).to_string())
                .or_insert_with(|| (kind, Vec::new()))
                .1
                .extend(lines);
        };

        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            push(name, "counter", vec![format!("{} {}", name, counter.get())]);
        }
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            push(name, "gauge", vec![format!("{} {}", name, gauge.get())]);
        }
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            let (family, labels) = split_labels(name);
            push(
                name,
                "histogram",
                vec![
                    format!("{}_count{} {}", family, labels, histogram.get_count()),
                    format!("{}_sum{} {}", family, labels, histogram.get_sum()),
                ],
            );
        }

        let mut output = String::new();
        for (family, (kind, mut lines)) in families {
            lines.sort();
            writeln!(output, "# TYPE {} {}", family, kind)
                .map_err(|e| MetricsError::ExportError(e.to_string()))?;
            for line in lines {
                writeln!(output, "{}", line)
                    .map_err(|e| MetricsError::ExportError(e.to_string()))?;
            }
        }
        Ok(output)
    }
}

fn family_name(key: &str) -> &str {
    split_labels(key).0
}

fn split_labels(key: &str) -> (&str, &str) {
    match key.find('{') {
        Some(idx) => key.split_at(idx),
        None => (key, ""),
    }
}

fn labelled(name: &str, kind: WorkflowKind) -> String {
    format!("{}{{kind=\"{}\"}}", name, kind.as_str())
}

lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

/// Workflow lifecycle metrics, labelled by document kind.
pub struct WorkflowMetrics;

impl WorkflowMetrics {
    pub fn record_created(kind: WorkflowKind) {
        increment_counter(&labelled("workflow_documents_created_total", kind));
    }

    pub fn record_approved(kind: WorkflowKind, elapsed: Duration) {
        increment_counter(&labelled("workflow_approvals_total", kind));
        observe_histogram(
            &labelled("workflow_approval_duration_seconds", kind),
            elapsed.as_secs_f64(),
        );
    }

    pub fn record_rejected(kind: WorkflowKind) {
        increment_counter(&labelled("workflow_rejections_total", kind));
    }

    pub fn record_approval_failure(kind: WorkflowKind) {
        increment_counter(&labelled("workflow_approval_failures_total", kind));
    }

    pub fn record_stock_units_moved(kind: WorkflowKind, units: u64) {
        METRICS
            .get_or_create_counter(&labelled("workflow_stock_units_moved_total", kind))
            .inc_by(units);
    }
}

/// `GET /metrics`
pub async fn metrics_handler() -> Result<Response, MetricsError> {
    let body = METRICS.export_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_groups_labelled_series_under_one_type_line() {
        let registry = MetricsRegistry::new();
        registry
            .get_or_create_counter(&labelled("approvals_total", WorkflowKind::Transfer))
            .inc();
        registry
            .get_or_create_counter(&labelled("approvals_total", WorkflowKind::WriteOff))
            .inc_by(3);

        let output = registry.export_metrics().unwrap();
        assert_eq!(output.matches("# TYPE approvals_total counter").count(), 1);
        assert!(output.contains("approvals_total{kind=\"transfer\"} 1"));
        assert!(output.contains("approvals_total{kind=\"write_off\"} 3"));
    }

    #[test]
    fn histogram_keeps_fractional_sums() {
        let registry = MetricsRegistry::new();
        let histogram = registry.get_or_create_histogram("latency_seconds");
        histogram.observe(0.25);
        histogram.observe(0.5);

        assert_eq!(histogram.get_count(), 2);
        assert!((histogram.get_sum() - 0.75).abs() < f64::EPSILON);

        let output = registry.export_metrics().unwrap();
        assert!(output.contains("latency_seconds_count 2"));
    }

    #[test]
    fn gauge_round_trips_floats() {
        let gauge = Gauge::new();
        gauge.set(12.5);
        assert_eq!(gauge.get(), 12.5);
    }
}
