use crate::application::processor::SignalProcessor;
use crate::domain::ports::ReadingRepository;
use crate::domain::reading::BpReading;
use crate::domain::risk::cvd_risk::CvdRiskScorer;
use crate::domain::risk::insights::ReadingInsights;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Streaming parameters of [`BpMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub sample_rate_hz: f64,
    /// Most recent samples handed to the pipeline.
    pub window_size: usize,
    /// Samples between two estimates.
    pub sample_interval: usize,
    pub risk_window_days: i64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: 125.0,
            window_size: 1000,
            sample_interval: 10_000,
            risk_window_days: 30,
        }
    }
}

/// Turns a live sample stream into periodic stored readings.
///
/// Keeps the last `window_size` samples. Every `sample_interval` samples the
/// window is run through the processor; a real measurement is rounded,
/// stored and returned, then the window starts over.
pub struct BpMonitor {
    processor: SignalProcessor,
    repository: Arc<dyn ReadingRepository>,
    settings: MonitorSettings,
    window: VecDeque<f64>,
    samples_seen: usize,
    last_reading: Option<BpReading>,
}

impl BpMonitor {
    pub fn new(
        processor: SignalProcessor,
        repository: Arc<dyn ReadingRepository>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            processor,
            repository,
            window: VecDeque::with_capacity(settings.window_size),
            settings,
            samples_seen: 0,
            last_reading: None,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Samples received since the last estimate.
    pub fn pending_samples(&self) -> usize {
        self.samples_seen
    }

    pub fn buffered_samples(&self) -> usize {
        self.window.len()
    }

    pub fn last_reading(&self) -> Option<&BpReading> {
        self.last_reading.as_ref()
    }

    pub fn push_sample(&mut self, sample: f64) -> Result<Option<BpReading>> {
        self.window.push_back(sample);
        while self.window.len() > self.settings.window_size {
            self.window.pop_front();
        }
        self.samples_seen += 1;

        if self.samples_seen >= self.settings.sample_interval {
            return self.estimate_window();
        }
        Ok(None)
    }

    /// Readings produced while consuming `samples`, oldest first.
    pub fn push_batch(&mut self, samples: &[f64]) -> Result<Vec<BpReading>> {
        let mut readings = Vec::new();
        for &sample in samples {
            if let Some(reading) = self.push_sample(sample)? {
                readings.push(reading);
            }
        }
        Ok(readings)
    }

    fn estimate_window(&mut self) -> Result<Option<BpReading>> {
        let samples: Vec<f64> = self.window.drain(..).collect();
        self.samples_seen = 0;

        let estimate = self
            .processor
            .process_signal(&samples, self.settings.sample_rate_hz);
        match estimate {
            Some(estimate) if estimate.is_measurement() => {
                let reading = BpReading::from_estimate(Utc::now(), &estimate);
                self.repository.save(&reading)?;
                info!(
                    "Stored reading {}/{} mmHg",
                    reading.systolic, reading.diastolic
                );
                self.last_reading = Some(reading.clone());
                Ok(Some(reading))
            }
            _ => {
                debug!("No measurement from a window of {} samples", samples.len());
                Ok(None)
            }
        }
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.settings.risk_window_days)
    }

    /// CVD risk over the stored readings of the reporting window ending at
    /// `now`; `None` when the window holds no reading.
    pub fn risk_over_window(&self, now: DateTime<Utc>) -> Result<Option<f64>> {
        let readings = self.repository.in_range(self.window_start(now), now)?;
        if readings.is_empty() {
            return Ok(None);
        }
        let systolic: Vec<i32> = readings.iter().map(|r| r.systolic).collect();
        let diastolic: Vec<i32> = readings.iter().map(|r| r.diastolic).collect();
        Ok(Some(CvdRiskScorer::new().score(&systolic, &diastolic)?))
    }

    pub fn insights_over_window(&self, now: DateTime<Utc>) -> Result<Option<ReadingInsights>> {
        let readings = self.repository.in_range(self.window_start(now), now)?;
        Ok(ReadingInsights::analyze(&readings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::{BpPredictor, LinearBpScorer, LinearHead, StandardScaler};
    use crate::infrastructure::repositories::InMemoryReadingRepository;
    use crate::infrastructure::simulation::SyntheticPpg;

    fn monitor(settings: MonitorSettings) -> (BpMonitor, InMemoryReadingRepository) {
        let scorer = LinearBpScorer::new(
            StandardScaler::identity(),
            LinearHead::constant(121.4),
            LinearHead::constant(79.6),
        );
        let processor = SignalProcessor::new(BpPredictor::new(Arc::new(scorer)));
        let repo = InMemoryReadingRepository::new();
        (
            BpMonitor::new(processor, Arc::new(repo.clone()), settings),
            repo,
        )
    }

    fn settings(window_size: usize, sample_interval: usize) -> MonitorSettings {
        MonitorSettings {
            window_size,
            sample_interval,
            ..MonitorSettings::default()
        }
    }

    #[test]
    fn test_window_keeps_latest_samples() {
        let (mut monitor, _) = monitor(settings(10, 100));
        monitor.push_batch(&[0.0; 25]).unwrap();
        assert_eq!(monitor.buffered_samples(), 10);
        assert_eq!(monitor.pending_samples(), 25);
    }

    #[test]
    fn test_emits_reading_every_interval() {
        let (mut monitor, repo) = monitor(settings(1250, 1250));
        let samples = SyntheticPpg::default().generate(125.0, 20.0);

        let readings = monitor.push_batch(&samples).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!((readings[0].systolic, readings[0].diastolic), (121, 80));
        assert_eq!(repo.len().unwrap(), 2);
        assert_eq!(monitor.last_reading(), readings.last());
        assert_eq!(monitor.pending_samples(), 0);
        assert_eq!(monitor.buffered_samples(), 0);
    }

    #[test]
    fn test_flat_window_stores_nothing() {
        let (mut monitor, repo) = monitor(settings(500, 500));
        assert!(monitor.push_batch(&[1.0; 500]).unwrap().is_empty());
        assert!(repo.is_empty().unwrap());
        assert!(monitor.last_reading().is_none());
    }

    #[test]
    fn test_too_short_window_stores_nothing() {
        // Sentinel estimates are not measurements.
        let (mut monitor, repo) = monitor(settings(20, 20));
        assert!(monitor.push_batch(&[1.0; 20]).unwrap().is_empty());
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn test_risk_over_window() {
        let (monitor, repo) = monitor(MonitorSettings::default());
        let now = Utc::now();
        assert_eq!(monitor.risk_over_window(now).unwrap(), None);

        repo.save_all(&[
            BpReading::new(now - Duration::days(40), 200, 120),
            BpReading::new(now - Duration::days(3), 118, 79),
            BpReading::new(now - Duration::days(2), 119, 81),
            BpReading::new(now - Duration::days(1), 121, 83),
        ])
        .unwrap();

        let risk = monitor.risk_over_window(now).unwrap().unwrap();
        assert!((risk - 10.0).abs() < 1e-9);

        let insights = monitor.insights_over_window(now).unwrap().unwrap();
        assert_eq!(insights.reading_count, 3);
    }
}
