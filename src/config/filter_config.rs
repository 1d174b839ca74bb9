//! Band-pass filter configuration parsing from environment variables.

use super::parse_env;
use crate::application::dsp::BandpassFilter;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Band-pass filter environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterEnvConfig {
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub order: usize,
}

impl Default for FilterEnvConfig {
    fn default() -> Self {
        let filter = BandpassFilter::default();
        Self {
            low_cut_hz: filter.low_cut_hz,
            high_cut_hz: filter.high_cut_hz,
            order: filter.order,
        }
    }
}

impl FilterEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            low_cut_hz: parse_env("BANDPASS_LOW_HZ", defaults.low_cut_hz)?,
            high_cut_hz: parse_env("BANDPASS_HIGH_HZ", defaults.high_cut_hz)?,
            order: parse_env("BANDPASS_ORDER", defaults.order)?,
        })
    }

    pub fn to_filter(&self) -> BandpassFilter {
        BandpassFilter::new(self.low_cut_hz, self.high_cut_hz, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_config_defaults() {
        let config = FilterEnvConfig::default();
        assert_eq!(config.to_filter(), BandpassFilter::default());
    }
}
