use super::scaler::{StandardScaler, check_vector};
use crate::domain::errors::ScorerError;
use crate::domain::ports::BpScorer;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Persisted scaler and the two fitted forests.
#[derive(Serialize, Deserialize)]
pub struct ForestBundle {
    pub scaler: StandardScaler,
    pub systolic: ForestRegressor,
    pub diastolic: ForestRegressor,
}

/// Random-forest scorer loaded from a JSON bundle.
///
/// A missing or unreadable bundle does not fail construction; every
/// prediction then reports `ModelUnavailable`.
pub struct SmartCoreBpScorer {
    bundle: Option<ForestBundle>,
    model_path: PathBuf,
}

impl SmartCoreBpScorer {
    pub fn new(model_path: PathBuf) -> Self {
        let mut scorer = Self {
            bundle: None,
            model_path,
        };
        scorer.load_model();
        scorer
    }

    pub fn from_bundle(bundle: ForestBundle) -> Self {
        Self {
            bundle: Some(bundle),
            model_path: PathBuf::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn load_model(&mut self) {
        if !self.model_path.exists() {
            warn!(
                "BP model file not found at {:?}. Predictions will be unavailable.",
                self.model_path
            );
            return;
        }

        match File::open(&self.model_path) {
            Ok(mut file) => {
                let mut buffer = Vec::new();
                if let Err(e) = file.read_to_end(&mut buffer) {
                    error!("Failed to read BP model file: {}", e);
                    return;
                }

                match serde_json::from_slice(&buffer) {
                    Ok(bundle) => {
                        info!("Successfully loaded BP model from {:?}", self.model_path);
                        self.bundle = Some(bundle);
                    }
                    Err(e) => {
                        error!("Failed to deserialize BP model: {}", e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to open BP model file: {}", e);
            }
        }
    }

    fn bundle(&self) -> Result<&ForestBundle, ScorerError> {
        self.bundle.as_ref().ok_or_else(|| ScorerError::ModelUnavailable {
            reason: format!("no model loaded from {}", self.model_path.display()),
        })
    }
}

fn predict_one(model: &ForestRegressor, standardized: &[f64]) -> Result<f64, ScorerError> {
    check_vector(standardized)?;
    let input = DenseMatrix::from_2d_vec(&vec![standardized.to_vec()]).map_err(|e| {
        ScorerError::PredictionFailed {
            reason: format!("matrix creation failed: {e}"),
        }
    })?;
    let predictions = model
        .predict(&input)
        .map_err(|e| ScorerError::PredictionFailed {
            reason: e.to_string(),
        })?;
    predictions
        .first()
        .copied()
        .ok_or_else(|| ScorerError::PredictionFailed {
            reason: "no prediction returned".to_string(),
        })
}

impl BpScorer for SmartCoreBpScorer {
    fn standardize(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        self.bundle()?.scaler.transform(features)
    }

    fn predict_sbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        predict_one(&self.bundle()?.systolic, standardized)
    }

    fn predict_dbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        predict_one(&self.bundle()?.diastolic, standardized)
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}
