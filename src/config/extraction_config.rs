//! Pulse extraction thresholds from environment variables.

use super::parse_env;
use crate::application::pulse_extractor::ExtractionParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Peak-search thresholds environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionEnvConfig {
    pub systolic_prominence: f64,
    pub diastolic_prominence: f64,
    pub systolic_distance_secs: f64,
    pub diastolic_distance_secs: f64,
    pub dicrotic_distance_secs: f64,
}

impl Default for ExtractionEnvConfig {
    fn default() -> Self {
        let params = ExtractionParams::default();
        Self {
            systolic_prominence: params.systolic_prominence,
            diastolic_prominence: params.diastolic_prominence,
            systolic_distance_secs: params.systolic_distance_secs,
            diastolic_distance_secs: params.diastolic_distance_secs,
            dicrotic_distance_secs: params.dicrotic_distance_secs,
        }
    }
}

impl ExtractionEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            systolic_prominence: parse_env("SYSTOLIC_PROMINENCE", defaults.systolic_prominence)?,
            diastolic_prominence: parse_env("DIASTOLIC_PROMINENCE", defaults.diastolic_prominence)?,
            systolic_distance_secs: parse_env(
                "SYSTOLIC_DISTANCE_SECS",
                defaults.systolic_distance_secs,
            )?,
            diastolic_distance_secs: parse_env(
                "DIASTOLIC_DISTANCE_SECS",
                defaults.diastolic_distance_secs,
            )?,
            dicrotic_distance_secs: parse_env(
                "DICROTIC_DISTANCE_SECS",
                defaults.dicrotic_distance_secs,
            )?,
        })
    }

    pub fn to_params(&self) -> ExtractionParams {
        ExtractionParams {
            systolic_prominence: self.systolic_prominence,
            diastolic_prominence: self.diastolic_prominence,
            systolic_distance_secs: self.systolic_distance_secs,
            diastolic_distance_secs: self.diastolic_distance_secs,
            dicrotic_distance_secs: self.dicrotic_distance_secs,
        }
    }
}
