use crate::domain::errors::RiskError;
use statrs::statistics::{Data, Distribution};

/// Lower bounds of the 20/40/60/80/100 systolic buckets (mmHg).
const SYSTOLIC_BOUNDS: [f64; 5] = [120.0, 130.0, 140.0, 160.0, 180.0];
/// Lower bounds of the 20/40/60/80/100 diastolic buckets (mmHg).
const DIASTOLIC_BOUNDS: [f64; 5] = [80.0, 85.0, 90.0, 100.0, 110.0];

/// Heuristic cardiovascular risk index in `[0, 100]`.
///
/// Averages each pressure series, maps each average through a six-bucket step
/// function and returns the mean of the two bucket scores. No learned
/// parameters, no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct CvdRiskScorer;

impl CvdRiskScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, systolic: &[i32], diastolic: &[i32]) -> Result<f64, RiskError> {
        let avg_systolic = mean_pressure(systolic, "systolic")?;
        let avg_diastolic = mean_pressure(diastolic, "diastolic")?;
        Ok(self.score_averages(avg_systolic, avg_diastolic))
    }

    /// Score already-averaged pressures.
    pub fn score_averages(&self, avg_systolic: f64, avg_diastolic: f64) -> f64 {
        (bucket_score(avg_systolic, &SYSTOLIC_BOUNDS)
            + bucket_score(avg_diastolic, &DIASTOLIC_BOUNDS))
            / 2.0
    }

    pub fn systolic_component(&self, avg_systolic: f64) -> f64 {
        bucket_score(avg_systolic, &SYSTOLIC_BOUNDS)
    }

    pub fn diastolic_component(&self, avg_diastolic: f64) -> f64 {
        bucket_score(avg_diastolic, &DIASTOLIC_BOUNDS)
    }
}

/// Mean of a pressure series; empty series are rejected.
pub(crate) fn mean_pressure(samples: &[i32], label: &str) -> Result<f64, RiskError> {
    if samples.is_empty() {
        return Err(RiskError::InvalidInput {
            reason: format!("{label} samples are empty"),
        });
    }
    let data = Data::new(samples.iter().map(|&v| f64::from(v)).collect::<Vec<_>>());
    data.mean().ok_or_else(|| RiskError::InvalidInput {
        reason: format!("{label} mean is undefined"),
    })
}

/// Each bucket includes its lower bound and excludes its upper bound.
fn bucket_score(value: f64, bounds: &[f64; 5]) -> f64 {
    let bucket = bounds.iter().take_while(|&&b| value >= b).count();
    bucket as f64 * 20.0
}
