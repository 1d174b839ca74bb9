//! Pipeline-level settings: sample rate, pulse selection and model location.

use super::parse_env;
use crate::application::processor::PulseSelection;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "data/model/bp_model.json";

/// Pipeline environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineEnvConfig {
    pub sample_rate_hz: f64,
    pub pulse_selection: PulseSelection,
    pub model_path: PathBuf,
}

impl Default for PipelineEnvConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 125.0,
            pulse_selection: PulseSelection::First,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl PipelineEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            sample_rate_hz: parse_env("SAMPLE_RATE_HZ", defaults.sample_rate_hz)?,
            pulse_selection: parse_env("PULSE_SELECTION", defaults.pulse_selection)?,
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
        })
    }
}
