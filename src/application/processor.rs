use crate::application::dsp::BandpassFilter;
use crate::application::ml::BpPredictor;
use crate::application::pulse_extractor::{PulseExtraction, PulseFeatureExtractor};
use crate::domain::errors::{PipelineError, ScorerError, SignalError};
use crate::domain::pulse::BpEstimate;
use crate::domain::signal::Signal;
use crate::infrastructure::observability::{PipelineMetrics, SignalOutcome};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Median};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use tracing::{debug, error};

/// Which pulse(s) of a window feed the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseSelection {
    /// Earliest accepted pulse only.
    #[default]
    First,
    /// Predict every pulse and average each component.
    Mean,
    /// Predict every pulse and take each component's median.
    Median,
}

impl FromStr for PulseSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(PulseSelection::First),
            "mean" => Ok(PulseSelection::Mean),
            "median" => Ok(PulseSelection::Median),
            _ => anyhow::bail!(
                "Invalid PULSE_SELECTION: {}. Must be 'first', 'mean' or 'median'",
                s
            ),
        }
    }
}

impl fmt::Display for PulseSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PulseSelection::First => "first",
            PulseSelection::Mean => "mean",
            PulseSelection::Median => "median",
        };
        f.write_str(label)
    }
}

/// Filter -> extract -> select -> predict over one window of raw samples.
///
/// `process_signal` never fails: a window without pulses yields `None`, a
/// faulted window yields `Some(BpEstimate::SENTINEL)`.
#[derive(Debug, Clone)]
pub struct SignalProcessor {
    filter: BandpassFilter,
    extractor: PulseFeatureExtractor,
    predictor: BpPredictor,
    selection: PulseSelection,
    metrics: Option<PipelineMetrics>,
}

impl SignalProcessor {
    pub fn new(predictor: BpPredictor) -> Self {
        Self {
            filter: BandpassFilter::default(),
            extractor: PulseFeatureExtractor::default(),
            predictor,
            selection: PulseSelection::default(),
            metrics: None,
        }
    }

    pub fn with_filter(mut self, filter: BandpassFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_extractor(mut self, extractor: PulseFeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_selection(mut self, selection: PulseSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn selection(&self) -> PulseSelection {
        self.selection
    }

    pub fn metrics(&self) -> Option<&PipelineMetrics> {
        self.metrics.as_ref()
    }

    pub fn process_signal(&self, samples: &[f64], sample_rate_hz: f64) -> Option<BpEstimate> {
        let result = self.try_process(samples, sample_rate_hz);

        let outcome = match &result {
            Ok(Some(_)) => SignalOutcome::Estimate,
            Ok(None) => SignalOutcome::Empty,
            Err(_) => SignalOutcome::Error,
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome);
        }

        match result {
            Ok(estimate) => estimate,
            Err(e) => {
                error!(
                    "BP pipeline failed on {} samples at {} Hz: {}",
                    samples.len(),
                    sample_rate_hz,
                    e
                );
                Some(BpEstimate::SENTINEL)
            }
        }
    }

    /// Same pipeline with faults propagated.
    pub fn try_process(
        &self,
        samples: &[f64],
        sample_rate_hz: f64,
    ) -> Result<Option<BpEstimate>, PipelineError> {
        let extraction = self.extract(samples, sample_rate_hz)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_pulses(extraction.pulses.len(), extraction.rejected.len());
        }

        if extraction.pulses.is_empty() {
            debug!(
                "No pulse resolved in {} samples ({} candidates)",
                samples.len(),
                extraction.candidates
            );
            return Ok(None);
        }

        // A panicking scorer is reported as a prediction failure.
        let estimate = panic::catch_unwind(AssertUnwindSafe(|| {
            self.select_and_predict(&extraction)
        }))
        .unwrap_or_else(|payload| {
            Err(ScorerError::PredictionFailed {
                reason: format!("scorer panicked: {}", panic_message(payload.as_ref())),
            })
        })?;
        if let Some(metrics) = &self.metrics {
            metrics.observe_estimate(estimate.systolic, estimate.diastolic);
        }
        debug!(
            "Estimated {} from {} pulses ({} selection, {})",
            estimate,
            extraction.pulses.len(),
            self.selection,
            self.predictor.scorer_name()
        );
        Ok(Some(estimate))
    }

    /// Filter and extract without predicting.
    pub fn extract(
        &self,
        samples: &[f64],
        sample_rate_hz: f64,
    ) -> Result<PulseExtraction, SignalError> {
        self.extractor.params().validate()?;
        let raw = Signal::new(samples.to_vec(), sample_rate_hz)?;
        let filtered = self.filter.apply(&raw)?;
        Ok(self.extractor.extract_detailed(&filtered))
    }

    /// Independent windows processed in parallel; output order follows input order.
    pub fn process_batch(
        &self,
        signals: &[Vec<f64>],
        sample_rate_hz: f64,
    ) -> Vec<Option<BpEstimate>> {
        signals
            .par_iter()
            .map(|samples| self.process_signal(samples, sample_rate_hz))
            .collect()
    }

    fn select_and_predict(&self, extraction: &PulseExtraction) -> Result<BpEstimate, ScorerError> {
        let first = match extraction.pulses.first() {
            Some(pulse) => pulse,
            None => {
                return Err(ScorerError::PredictionFailed {
                    reason: "no pulse to score".to_string(),
                });
            }
        };

        if self.selection == PulseSelection::First {
            return self.predictor.predict(&first.features);
        }

        let estimates = extraction
            .pulses
            .iter()
            .map(|pulse| self.predictor.predict(&pulse.features))
            .collect::<Result<Vec<_>, _>>()?;
        let systolic: Vec<f64> = estimates.iter().map(|e| e.systolic).collect();
        let diastolic: Vec<f64> = estimates.iter().map(|e| e.diastolic).collect();

        let (systolic, diastolic) = match self.selection {
            PulseSelection::Median => (median(systolic), median(diastolic)),
            _ => (mean(systolic)?, mean(diastolic)?),
        };
        Ok(BpEstimate::new(systolic, diastolic))
    }
}

fn mean(values: Vec<f64>) -> Result<f64, ScorerError> {
    Data::new(values)
        .mean()
        .ok_or_else(|| ScorerError::PredictionFailed {
            reason: "cannot average an empty set of estimates".to_string(),
        })
}

fn median(values: Vec<f64>) -> f64 {
    Data::new(values).median()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
