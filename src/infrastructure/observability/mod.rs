//! Pull-free observability: metrics are collected in-process and rendered on demand.

pub mod metrics;

pub use metrics::{PipelineMetrics, SignalOutcome};
