use crate::domain::errors::ScorerError;
use crate::domain::ml::feature_registry::features_to_vector;
use crate::domain::ports::BpScorer;
use crate::domain::pulse::{BpEstimate, PulseFeatures};
use std::sync::Arc;

/// Maps one pulse's features to a pressure estimate through a fitted scorer.
///
/// The predictor knows nothing about how the scorer was trained; it only
/// fixes the feature order and applies the scorer's own standardization.
#[derive(Clone)]
pub struct BpPredictor {
    scorer: Arc<dyn BpScorer>,
}

impl BpPredictor {
    pub fn new(scorer: Arc<dyn BpScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn predict(&self, features: &PulseFeatures) -> Result<BpEstimate, ScorerError> {
        let vector = features_to_vector(features);
        let standardized = self.scorer.standardize(&vector)?;
        let systolic = self.scorer.predict_sbp(&standardized)?;
        let diastolic = self.scorer.predict_dbp(&standardized)?;
        Ok(BpEstimate::new(systolic, diastolic))
    }
}

impl std::fmt::Debug for BpPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpPredictor")
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FEATURE_COUNT;
    use std::sync::Mutex;

    /// Records what it was given and predicts from the first two entries.
    struct RecordingScorer {
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl BpScorer for RecordingScorer {
        fn standardize(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(features.iter().map(|v| v * 2.0).collect())
        }

        fn predict_sbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
            Ok(standardized[0])
        }

        fn predict_dbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
            Ok(standardized[1])
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct BrokenScorer;

    impl BpScorer for BrokenScorer {
        fn standardize(&self, _features: &[f64]) -> Result<Vec<f64>, ScorerError> {
            Err(ScorerError::ModelUnavailable {
                reason: "not loaded".to_string(),
            })
        }

        fn predict_sbp(&self, _standardized: &[f64]) -> Result<f64, ScorerError> {
            unreachable!()
        }

        fn predict_dbp(&self, _standardized: &[f64]) -> Result<f64, ScorerError> {
            unreachable!()
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_passes_features_in_registry_order() {
        let scorer = Arc::new(RecordingScorer {
            seen: Mutex::new(Vec::new()),
        });
        let predictor = BpPredictor::new(scorer.clone());
        let features = PulseFeatures {
            heart_rate: 60.0,
            systolic_peak: 40.0,
            t3: 7.0,
            ..PulseFeatures::default()
        };

        let estimate = predictor.predict(&features).unwrap();
        assert_eq!(estimate, BpEstimate::new(120.0, 80.0));

        let seen = scorer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), FEATURE_COUNT);
        assert_eq!(seen[0][FEATURE_COUNT - 1], 7.0);
    }

    #[test]
    fn test_scorer_errors_propagate() {
        let predictor = BpPredictor::new(Arc::new(BrokenScorer));
        assert!(matches!(
            predictor.predict(&PulseFeatures::default()),
            Err(ScorerError::ModelUnavailable { .. })
        ));
        assert_eq!(predictor.scorer_name(), "broken");
    }
}
