use super::scaler::{StandardScaler, check_vector};
use crate::domain::errors::ScorerError;
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use crate::domain::ports::BpScorer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{error, info};

/// `intercept + weights · x` over a standardized vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearHead {
    pub weights: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LinearHead {
    /// Ignores the features and always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            weights: [0.0; FEATURE_COUNT],
            intercept: value,
        }
    }

    pub fn evaluate(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        check_vector(standardized)?;
        let value = self.intercept
            + self
                .weights
                .iter()
                .zip(standardized)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ScorerError::PredictionFailed {
                reason: format!("linear head produced {value}"),
            })
        }
    }
}

/// Scaler plus one linear head per pressure, persisted as one JSON document:
///
/// ```json
/// { "scaler": { "mean": [..], "scale": [..] },
///   "systolic": { "weights": [..], "intercept": 118.0 },
///   "diastolic": { "weights": [..], "intercept": 76.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBpScorer {
    pub scaler: StandardScaler,
    pub systolic: LinearHead,
    pub diastolic: LinearHead,
}

impl LinearBpScorer {
    pub fn new(scaler: StandardScaler, systolic: LinearHead, diastolic: LinearHead) -> Self {
        Self {
            scaler,
            systolic,
            diastolic,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScorerError> {
        serde_json::from_str(json).map_err(|e| ScorerError::ModelUnavailable {
            reason: format!("invalid linear model: {e}"),
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ScorerError> {
        let file = File::open(path).map_err(|e| ScorerError::ModelUnavailable {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(scorer) => {
                info!("Loaded linear BP model from {:?}", path);
                Ok(scorer)
            }
            Err(e) => {
                error!("Failed to deserialize linear BP model: {}", e);
                Err(ScorerError::ModelUnavailable {
                    reason: format!("invalid linear model {}: {}", path.display(), e),
                })
            }
        }
    }

    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

impl BpScorer for LinearBpScorer {
    fn standardize(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        self.scaler.transform(features)
    }

    fn predict_sbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        self.systolic.evaluate(standardized)
    }

    fn predict_dbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        self.diastolic.evaluate(standardized)
    }

    fn name(&self) -> &str {
        "Linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LinearBpScorer {
        let mut weights = [0.0; FEATURE_COUNT];
        weights[0] = 2.0;
        LinearBpScorer::new(
            StandardScaler::identity(),
            LinearHead {
                weights,
                intercept: 100.0,
            },
            LinearHead::constant(75.0),
        )
    }

    #[test]
    fn test_predicts_from_heads() {
        let scorer = scorer();
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 10.0;
        let z = scorer.standardize(&x).unwrap();
        assert!((scorer.predict_sbp(&z).unwrap() - 120.0).abs() < 1e-12);
        assert!((scorer.predict_dbp(&z).unwrap() - 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("ppg_bp_linear_{}", uuid::Uuid::new_v4()));
        let path = dir.join("model.json");
        scorer().to_json_file(&path).unwrap();

        let loaded = LinearBpScorer::from_json_file(&path).unwrap();
        assert_eq!(loaded, scorer());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = LinearBpScorer::from_json_file(Path::new("/nonexistent/ppg_bp/model.json"));
        assert!(matches!(result, Err(ScorerError::ModelUnavailable { .. })));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            scorer().predict_sbp(&[0.0; 3]),
            Err(ScorerError::MalformedVector { .. })
        ));
    }
}
