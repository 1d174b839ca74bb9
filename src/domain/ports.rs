use crate::domain::errors::ScorerError;
use crate::domain::reading::BpReading;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Capability interface of a fitted blood pressure model.
///
/// Implementations must be deterministic and free of side effects so a
/// single instance can be shared across threads. Failures should be
/// returned as `ScorerError`; a panic is caught by the pipeline and
/// reported as `ScorerError::PredictionFailed`.
pub trait BpScorer: Send + Sync {
    /// Apply the persisted feature standardization.
    fn standardize(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError>;

    /// Systolic pressure (mmHg) from a standardized vector.
    fn predict_sbp(&self, standardized: &[f64]) -> Result<f64, ScorerError>;

    /// Diastolic pressure (mmHg) from a standardized vector.
    fn predict_dbp(&self, standardized: &[f64]) -> Result<f64, ScorerError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Storage of timestamped readings.
pub trait ReadingRepository: Send + Sync {
    fn save(&self, reading: &BpReading) -> Result<()>;
    fn save_all(&self, readings: &[BpReading]) -> Result<()>;
    fn latest(&self) -> Result<Option<BpReading>>;
    /// Readings with `start <= timestamp <= end`, oldest first.
    fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BpReading>>;
    fn all(&self) -> Result<Vec<BpReading>>;
    fn clear(&self) -> Result<()>;
}
