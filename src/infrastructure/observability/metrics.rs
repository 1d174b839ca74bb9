//! Prometheus metrics for the estimation pipeline
//!
//! All metrics use the `ppg_bp_` prefix and are read-only.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;

/// Outcome label of `ppg_bp_signals_processed_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Estimate,
    Empty,
    Error,
}

impl SignalOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalOutcome::Estimate => "estimate",
            SignalOutcome::Empty => "empty",
            SignalOutcome::Error => "error",
        }
    }
}

/// Prometheus metrics for the PPG pipeline
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Arc<Registry>,
    /// Signals processed, by outcome
    pub signals_processed_total: CounterVec,
    /// Candidate pulses, by accepted/rejected
    pub pulses_total: CounterVec,
    /// Emitted estimates in mmHg, by systolic/diastolic
    pub estimate_mmhg: HistogramVec,
}

impl PipelineMetrics {
    /// Create a new instance with every collector registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let signals_processed_total = CounterVec::new(
            Opts::new(
                "ppg_bp_signals_processed_total",
                "Signals run through the pipeline by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(signals_processed_total.clone()))?;

        let pulses_total = CounterVec::new(
            Opts::new("ppg_bp_pulses_total", "Candidate pulses by extraction result"),
            &["result"],
        )?;
        registry.register(Box::new(pulses_total.clone()))?;

        let estimate_mmhg = HistogramVec::new(
            HistogramOpts::new("ppg_bp_estimate_mmhg", "Emitted pressure estimates in mmHg")
                .buckets(vec![
                    40.0, 60.0, 80.0, 90.0, 100.0, 120.0, 140.0, 160.0, 180.0, 220.0,
                ]),
            &["component"],
        )?;
        registry.register(Box::new(estimate_mmhg.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            signals_processed_total,
            pulses_total,
            estimate_mmhg,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_outcome(&self, outcome: SignalOutcome) {
        self.signals_processed_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    pub fn record_pulses(&self, accepted: usize, rejected: usize) {
        self.pulses_total
            .with_label_values(&["accepted"])
            .inc_by(accepted as f64);
        self.pulses_total
            .with_label_values(&["rejected"])
            .inc_by(rejected as f64);
    }

    pub fn observe_estimate(&self, systolic: f64, diastolic: f64) {
        self.estimate_mmhg
            .with_label_values(&["systolic"])
            .observe(systolic);
        self.estimate_mmhg
            .with_label_values(&["diastolic"])
            .observe(diastolic);
    }
}

impl fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineMetrics")
            .field("families", &self.registry.gather().len())
            .finish_non_exhaustive()
    }
}
