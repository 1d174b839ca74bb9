//! Streaming monitor configuration parsing from environment variables.

use super::parse_env;
use crate::application::monitor::MonitorSettings;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Streaming monitor environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorEnvConfig {
    pub sample_interval: usize,
    pub window_size: usize,
    pub risk_window_days: i64,
}

impl Default for MonitorEnvConfig {
    fn default() -> Self {
        let settings = MonitorSettings::default();
        Self {
            sample_interval: settings.sample_interval,
            window_size: settings.window_size,
            risk_window_days: settings.risk_window_days,
        }
    }
}

impl MonitorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            sample_interval: parse_env("MONITOR_SAMPLE_INTERVAL", defaults.sample_interval)?,
            window_size: parse_env("MONITOR_WINDOW_SIZE", defaults.window_size)?,
            risk_window_days: parse_env("RISK_WINDOW_DAYS", defaults.risk_window_days)?,
        })
    }

    pub fn to_settings(&self, sample_rate_hz: f64) -> MonitorSettings {
        MonitorSettings {
            sample_rate_hz,
            window_size: self.window_size,
            sample_interval: self.sample_interval,
            risk_window_days: self.risk_window_days,
        }
    }
}
