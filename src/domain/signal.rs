use crate::domain::errors::SignalError;

/// A uniformly sampled waveform.
///
/// Always holds at least one sample and a finite, positive sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate_hz: f64,
}

impl Signal {
    pub fn new(samples: Vec<f64>, sample_rate_hz: f64) -> Result<Self, SignalError> {
        if samples.is_empty() {
            return Err(SignalError::invalid("signal has no samples"));
        }
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(SignalError::invalid(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }
        Ok(Self {
            samples,
            sample_rate_hz,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz
    }

    /// Replace the samples, keeping the sample rate.
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Self {
        Self {
            samples,
            sample_rate_hz: self.sample_rate_hz,
        }
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_signal() {
        assert!(matches!(
            Signal::new(vec![], 125.0),
            Err(SignalError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        assert!(Signal::new(vec![1.0], 0.0).is_err());
        assert!(Signal::new(vec![1.0], -5.0).is_err());
        assert!(Signal::new(vec![1.0], f64::NAN).is_err());
    }

    #[test]
    fn test_duration() {
        let signal = Signal::new(vec![0.0; 250], 125.0).unwrap();
        assert_eq!(signal.len(), 250);
        assert!((signal.duration_secs() - 2.0).abs() < 1e-12);
    }
}
