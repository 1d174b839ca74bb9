use crate::domain::errors::SignalError;
use crate::domain::signal::Signal;
use sci_rs::signal::filter::design::{
    DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter, butter_dyn,
};
use sci_rs::signal::filter::sosfiltfilt_dyn;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Zero-phase Butterworth band-pass filter isolating the cardiac band.
///
/// The filter runs forward and backward over the signal so peak positions are
/// not shifted; downstream feature extraction is purely index based and
/// relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassFilter {
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub order: usize,
}

impl Default for BandpassFilter {
    fn default() -> Self {
        Self {
            low_cut_hz: 0.5,
            high_cut_hz: 3.0,
            order: 4,
        }
    }
}

impl BandpassFilter {
    pub fn new(low_cut_hz: f64, high_cut_hz: f64, order: usize) -> Self {
        Self {
            low_cut_hz,
            high_cut_hz,
            order,
        }
    }

    /// Check `0 < low < high < fs / 2` and `order >= 1`.
    pub fn validate(&self, sample_rate_hz: f64) -> Result<(), SignalError> {
        let nyquist = 0.5 * sample_rate_hz;
        if self.order == 0 {
            return Err(SignalError::invalid("filter order must be at least 1"));
        }
        if !(self.low_cut_hz.is_finite() && self.high_cut_hz.is_finite()) {
            return Err(SignalError::invalid("cutoff frequencies must be finite"));
        }
        if self.low_cut_hz <= 0.0
            || self.low_cut_hz >= self.high_cut_hz
            || self.high_cut_hz >= nyquist
        {
            return Err(SignalError::invalid(format!(
                "cutoffs must satisfy 0 < low < high < nyquist, got low={} high={} nyquist={}",
                self.low_cut_hz, self.high_cut_hz, nyquist
            )));
        }
        Ok(())
    }

    /// Minimum number of samples (exclusive) the forward-backward pass can pad.
    pub fn min_signal_len(&self) -> usize {
        // One second-order section per order for a band-pass design.
        3 * (2 * self.order + 1)
    }

    /// Filter `signal`; the output has the same length and sample rate.
    pub fn apply(&self, signal: &Signal) -> Result<Signal, SignalError> {
        let filtered = self.filter(signal.samples(), signal.sample_rate_hz())?;
        Ok(signal.with_samples(filtered))
    }

    /// Filter raw samples taken at `sample_rate_hz`.
    pub fn filter(&self, samples: &[f64], sample_rate_hz: f64) -> Result<Vec<f64>, SignalError> {
        self.validate(sample_rate_hz)?;

        let required = self.min_signal_len();
        if samples.len() <= required {
            return Err(SignalError::SignalTooShort {
                len: samples.len(),
                required,
            });
        }

        let sos = self.design(sample_rate_hz)?;
        let filtered: Vec<f64> = sosfiltfilt_dyn(samples.iter(), &sos);
        debug!(
            "Band-pass {:.2}-{:.2} Hz (order {}) over {} samples",
            self.low_cut_hz,
            self.high_cut_hz,
            self.order,
            samples.len()
        );
        Ok(filtered)
    }

    fn design(&self, sample_rate_hz: f64) -> Result<Vec<Sos<f64>>, SignalError> {
        let nyquist = 0.5 * sample_rate_hz;
        let wn = vec![self.low_cut_hz / nyquist, self.high_cut_hz / nyquist];
        let filter = butter_dyn(
            self.order,
            wn,
            Some(FilterBandType::Bandpass),
            Some(false),
            Some(FilterOutputType::Sos),
            None,
        );
        match filter {
            DigitalFilter::Sos(SosFormatFilter { sos }) => Ok(sos),
            _ => Err(SignalError::invalid(
                "Butterworth design did not produce second-order sections",
            )),
        }
    }
}
