use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Idealized PPG source built from the first two harmonics of the cardiac
/// cycle.
///
/// `baseline + amplitude * (cos θ + harmonic_ratio * cos(2θ - harmonic_phase))`
/// with `θ = 2π * (heart_rate / 60) * t`. With the default shape every beat
/// keeps a systolic peak, a shallow dicrotic notch and a dicrotic wave after
/// the 0.5-3 Hz band-pass, so the extractor resolves one pulse per beat away
/// from the signal edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticPpg {
    pub heart_rate_bpm: f64,
    pub amplitude: f64,
    pub baseline: f64,
    pub harmonic_ratio: f64,
    /// Radians
    pub harmonic_phase: f64,
    /// Half-width of the uniform noise band; 0 disables noise.
    pub noise_amplitude: f64,
    pub seed: u64,
}

impl Default for SyntheticPpg {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 60.0,
            amplitude: 0.17,
            baseline: 1.5,
            harmonic_ratio: 0.4,
            harmonic_phase: 3.403,
            noise_amplitude: 0.0,
            seed: 42,
        }
    }
}

impl SyntheticPpg {
    pub fn with_heart_rate(mut self, heart_rate_bpm: f64) -> Self {
        self.heart_rate_bpm = heart_rate_bpm;
        self
    }

    pub fn with_noise(mut self, noise_amplitude: f64, seed: u64) -> Self {
        self.noise_amplitude = noise_amplitude;
        self.seed = seed;
        self
    }

    /// Noise-free value at time `t` seconds.
    pub fn value_at(&self, t: f64) -> f64 {
        let theta = 2.0 * PI * (self.heart_rate_bpm / 60.0) * t;
        self.baseline
            + self.amplitude
                * (theta.cos() + self.harmonic_ratio * (2.0 * theta - self.harmonic_phase).cos())
    }

    /// `floor(sample_rate_hz * duration_secs)` samples starting at t = 0.
    pub fn generate(&self, sample_rate_hz: f64, duration_secs: f64) -> Vec<f64> {
        let n = (sample_rate_hz * duration_secs).max(0.0) as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..n)
            .map(|i| {
                let clean = self.value_at(i as f64 / sample_rate_hz);
                if self.noise_amplitude > 0.0 {
                    clean + rng.random_range(-self.noise_amplitude..=self.noise_amplitude)
                } else {
                    clean
                }
            })
            .collect()
    }

    /// Sample indices of the noise-free maxima (θ = 0 mod 2π) in `[0, n)`.
    pub fn beat_onsets(&self, sample_rate_hz: f64, n: usize) -> Vec<usize> {
        let period = sample_rate_hz * 60.0 / self.heart_rate_bpm;
        (0..)
            .map(|k| (k as f64 * period).round() as usize)
            .take_while(|&i| i < n)
            .collect()
    }
}
