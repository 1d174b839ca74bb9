use crate::domain::errors::ScorerError;
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

/// Per-feature `(x - mean) / scale` standardization persisted with a model.
///
/// A zero scale entry marks a constant feature in the fitting data and is
/// treated as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        Self { mean, scale }
    }

    /// Leaves vectors unchanged.
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        check_vector(features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::identity()
    }
}

/// Vectors handed to a scorer must hold exactly the registry's features, all finite.
pub fn check_vector(vector: &[f64]) -> Result<(), ScorerError> {
    if vector.len() != FEATURE_COUNT {
        return Err(ScorerError::MalformedVector {
            reason: format!("expected {} features, got {}", FEATURE_COUNT, vector.len()),
        });
    }
    if let Some(i) = vector.iter().position(|v| !v.is_finite()) {
        return Err(ScorerError::MalformedVector {
            reason: format!("feature {} is not finite ({})", i, vector[i]),
        });
    }
    Ok(())
}
