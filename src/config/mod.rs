//! Configuration module.
//!
//! Structured configuration loading from environment variables (or a TOML
//! file), organized by concern: Filter, Extraction, Pipeline and Monitor.

mod extraction_config;
mod filter_config;
mod monitor_config;
mod pipeline_config;

pub use extraction_config::ExtractionEnvConfig;
pub use filter_config::FilterEnvConfig;
pub use monitor_config::MonitorEnvConfig;
pub use pipeline_config::{DEFAULT_MODEL_PATH, PipelineEnvConfig};

use crate::application::dsp::BandpassFilter;
use crate::application::monitor::MonitorSettings;
use crate::application::pulse_extractor::{ExtractionParams, PulseFeatureExtractor};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Unset variables fall back to `default`; set but unparsable ones are errors.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            Into::<anyhow::Error>::into(e).context(format!("Failed to parse {}", key))
        }),
        Err(_) => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineEnvConfig,
    pub filter: FilterEnvConfig,
    pub extraction: ExtractionEnvConfig,
    pub monitor: MonitorEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            pipeline: PipelineEnvConfig::from_env().context("Failed to load pipeline config")?,
            filter: FilterEnvConfig::from_env().context("Failed to load filter config")?,
            extraction: ExtractionEnvConfig::from_env()
                .context("Failed to load extraction config")?,
            monitor: MonitorEnvConfig::from_env().context("Failed to load monitor config")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sections and keys missing from the file take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .context(format!("Failed to parse config TOML: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bandpass_filter()
            .validate(self.pipeline.sample_rate_hz)
            .context("Invalid band-pass configuration")?;
        self.extraction_params()
            .validate()
            .context("Invalid extraction configuration")?;
        if self.monitor.window_size == 0 || self.monitor.sample_interval == 0 {
            bail!("MONITOR_WINDOW_SIZE and MONITOR_SAMPLE_INTERVAL must be positive");
        }
        if self.monitor.risk_window_days <= 0 {
            bail!("RISK_WINDOW_DAYS must be positive");
        }
        Ok(())
    }

    pub fn bandpass_filter(&self) -> BandpassFilter {
        self.filter.to_filter()
    }

    pub fn extraction_params(&self) -> ExtractionParams {
        self.extraction.to_params()
    }

    pub fn extractor(&self) -> PulseFeatureExtractor {
        PulseFeatureExtractor::new(self.extraction_params())
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        self.monitor.to_settings(self.pipeline.sample_rate_hz)
    }
}
