//! Latency histograms for the translation path.
//! Each metric keeps a bounded ring of samples and reports p50/p95/p99.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Measures one operation; records only when `finish` is called.
pub struct TimingSpan {
    name: &'static str,
    start: Instant,
    registry: Arc<MetricsRegistry>,
}

impl TimingSpan {
    pub fn new(name: &'static str, registry: Arc<MetricsRegistry>) -> Self {
        Self {
            name,
            start: Instant::now(),
            registry,
        }
    }

    pub fn finish(self) -> f64 {
        let elapsed_us = self.start.elapsed().as_micros() as f64;
        self.registry.record(self.name, elapsed_us);
        elapsed_us
    }

    pub fn elapsed_us(&self) -> f64 {
        self.start.elapsed().as_micros() as f64
    }
}

/// Most recent samples for one metric; the oldest is evicted once full.
struct SampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SampleWindow {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    fn summarize(&self) -> MetricSummary {
        let sorted = self.sorted();
        MetricSummary {
            p50_us: nearest_rank(&sorted, 50.0),
            p95_us: nearest_rank(&sorted, 95.0),
            p99_us: nearest_rank(&sorted, 99.0),
            count: sorted.len(),
        }
    }
}

/// `p` in 0..=100 over an ascending slice; 0.0 when empty.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.0;
    };
    let idx = ((p.clamp(0.0, 100.0) / 100.0) * last as f64).round() as usize;
    sorted[idx.min(last)]
}

/// Named latency windows, shared between the translation path and `/admin`.
pub struct MetricsRegistry {
    windows: Mutex<HashMap<&'static str, SampleWindow>>,
    window_size: usize,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(window_size: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window_size: window_size.max(1),
        }
    }

    /// Record a sample, in microseconds.
    pub fn record(&self, name: &'static str, value_us: f64) {
        self.windows
            .lock()
            .entry(name)
            .or_insert_with(|| SampleWindow::new(self.window_size))
            .push(value_us);
        tracing::trace!(metric = name, value_us, "sample recorded");
    }

    pub fn span(self: &Arc<Self>, name: &'static str) -> TimingSpan {
        TimingSpan::new(name, Arc::clone(self))
    }

    pub fn percentile(&self, name: &str, p: f64) -> f64 {
        self.windows
            .lock()
            .get(name)
            .map(|window| nearest_rank(&window.sorted(), p))
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> HashMap<String, MetricSummary> {
        self.windows
            .lock()
            .iter()
            .map(|(name, window)| (name.to_string(), window.summarize()))
            .collect()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricSummary {
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub count: usize,
}

/// Well-known metric names.
pub mod metric_names {
    /// Successful completion-service round trip.
    pub const GATEWAY_CALL: &str = "t_gateway_call";
    /// Time until a completion-service call failed.
    pub const GATEWAY_ERROR: &str = "t_gateway_error";
    /// Whole translation including request building and caching.
    pub const TRANSLATE_TOTAL: &str = "t_translate_total";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentiles_over_recorded_samples() {
        let registry = MetricsRegistry::new();
        for v in 1..=100 {
            registry.record(metric_names::GATEWAY_CALL, v as f64);
        }
        assert_eq!(registry.percentile(metric_names::GATEWAY_CALL, 50.0), 51.0);
        assert_eq!(registry.percentile(metric_names::GATEWAY_CALL, 99.0), 99.0);
        assert_eq!(registry.percentile(metric_names::GATEWAY_CALL, 100.0), 100.0);
        assert_eq!(registry.percentile("missing", 50.0), 0.0);
    }

    #[test]
    fn ring_keeps_only_latest_samples() {
        let registry = MetricsRegistry::with_capacity(4);
        for v in [1000.0, 1000.0, 1.0, 2.0, 3.0, 4.0] {
            registry.record(metric_names::GATEWAY_ERROR, v);
        }
        let summary = registry.summary();
        let s = &summary[metric_names::GATEWAY_ERROR];
        assert_eq!(s.count, 4);
        assert_eq!(s.p99_us, 4.0);
    }

    #[test]
    fn span_records_on_finish() {
        let registry = Arc::new(MetricsRegistry::new());
        let span = registry.span(metric_names::TRANSLATE_TOTAL);
        span.finish();
        assert_eq!(registry.summary()[metric_names::TRANSLATE_TOTAL].count, 1);
    }
}
