use crate::application::dsp::peaks::{
    PeakCriteria, find_peaks, find_troughs, first_peak, first_trough,
};
use crate::domain::errors::SignalError;
use crate::domain::ml::feature_registry::features_to_vector;
use crate::domain::pulse::{ExtractedPulse, FiducialPoints, PulseFeatures};
use crate::domain::signal::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Peak-search thresholds of the extractor.
///
/// Prominences are in filtered-signal units, distances in seconds and
/// converted to `floor(secs * fs)` samples (at least one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParams {
    pub systolic_prominence: f64,
    pub diastolic_prominence: f64,
    /// 0.25 s caps the detectable heart rate at 240 bpm.
    pub systolic_distance_secs: f64,
    pub diastolic_distance_secs: f64,
    pub dicrotic_distance_secs: f64,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            systolic_prominence: 0.01,
            diastolic_prominence: 0.05,
            systolic_distance_secs: 0.25,
            diastolic_distance_secs: 0.5,
            dicrotic_distance_secs: 0.1,
        }
    }
}

impl ExtractionParams {
    pub fn validate(&self) -> Result<(), SignalError> {
        let values = [
            ("systolic_prominence", self.systolic_prominence),
            ("diastolic_prominence", self.diastolic_prominence),
            ("systolic_distance_secs", self.systolic_distance_secs),
            ("diastolic_distance_secs", self.diastolic_distance_secs),
            ("dicrotic_distance_secs", self.dicrotic_distance_secs),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(SignalError::invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn systolic_criteria(&self, sample_rate_hz: f64) -> PeakCriteria {
        PeakCriteria::default()
            .with_distance(distance_samples(self.systolic_distance_secs, sample_rate_hz))
            .with_prominence(self.systolic_prominence)
    }

    pub fn diastolic_criteria(&self, sample_rate_hz: f64) -> PeakCriteria {
        PeakCriteria::default()
            .with_distance(distance_samples(self.diastolic_distance_secs, sample_rate_hz))
            .with_prominence(self.diastolic_prominence)
    }

    /// Shared by the notch and dicrotic-peak searches; no prominence floor.
    pub fn dicrotic_criteria(&self, sample_rate_hz: f64) -> PeakCriteria {
        PeakCriteria::default()
            .with_distance(distance_samples(self.dicrotic_distance_secs, sample_rate_hz))
    }
}

/// `floor(secs * fs)` clamped to at least one sample.
pub fn distance_samples(secs: f64, sample_rate_hz: f64) -> usize {
    ((secs * sample_rate_hz).floor() as usize).max(1)
}

/// Why a candidate pulse was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NoDiastolicBefore,
    NoDiastolicAfter,
    NoNotch,
    NoDicroticPeak,
    /// Fewer than two samples between the preceding diastolic point and the peak.
    UpstrokeTooShort,
    ZeroDicroticAmplitude,
    ZeroPulseInterval,
    NonFiniteFeature,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectReason::NoDiastolicBefore => "no diastolic point before the peak",
            RejectReason::NoDiastolicAfter => "no diastolic point after the peak",
            RejectReason::NoNotch => "no dicrotic notch",
            RejectReason::NoDicroticPeak => "no dicrotic peak",
            RejectReason::UpstrokeTooShort => "upstroke too short for a slope",
            RejectReason::ZeroDicroticAmplitude => "dicrotic peak amplitude is zero",
            RejectReason::ZeroPulseInterval => "zero pulse interval",
            RejectReason::NonFiniteFeature => "non-finite feature",
        };
        f.write_str(label)
    }
}

/// Rejection of the pulse starting at `systolic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedPulse {
    pub systolic: usize,
    pub reason: RejectReason,
}

/// Full result of one extraction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PulseExtraction {
    pub pulses: Vec<ExtractedPulse>,
    pub rejected: Vec<RejectedPulse>,
    /// Number of systolic-peak pairs examined.
    pub candidates: usize,
}

impl PulseExtraction {
    pub fn features(&self) -> Vec<PulseFeatures> {
        self.pulses.iter().map(|p| p.features).collect()
    }

    pub fn count_rejected(&self, reason: RejectReason) -> usize {
        self.rejected.iter().filter(|r| r.reason == reason).count()
    }
}

/// Locates the fiducial points of every pulse in a band-passed PPG and turns
/// each resolvable pulse into a [`PulseFeatures`] record.
///
/// Pulses are formed from consecutive systolic peaks. A pulse whose landmarks
/// cannot be found is skipped without affecting the pulses after it; an empty
/// result is a valid outcome.
#[derive(Debug, Clone, Default)]
pub struct PulseFeatureExtractor {
    params: ExtractionParams,
}

impl PulseFeatureExtractor {
    pub fn new(params: ExtractionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ExtractionParams {
        &self.params
    }

    /// Features of every accepted pulse, in time order.
    pub fn extract(&self, filtered: &Signal) -> Vec<PulseFeatures> {
        self.extract_detailed(filtered).features()
    }

    pub fn extract_detailed(&self, filtered: &Signal) -> PulseExtraction {
        let x = filtered.samples();
        let fs = filtered.sample_rate_hz();

        let systolic = systolic_peaks(x, &self.params, fs);
        let diastolic = diastolic_points(x, &self.params, fs);
        let dicrotic = self.params.dicrotic_criteria(fs);

        let mut extraction = PulseExtraction::default();
        for pair in systolic.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            extraction.candidates += 1;

            match resolve_pulse(x, fs, current, next, &diastolic, &dicrotic) {
                Ok(pulse) => extraction.pulses.push(pulse),
                Err(reason) => {
                    trace!("Pulse at sample {} rejected: {}", current, reason);
                    extraction.rejected.push(RejectedPulse {
                        systolic: current,
                        reason,
                    });
                }
            }
        }

        debug!(
            "Extracted {} pulses from {} candidates ({} systolic peaks, {} diastolic points, {} rejected)",
            extraction.pulses.len(),
            extraction.candidates,
            systolic.len(),
            diastolic.len(),
            extraction.rejected.len()
        );
        extraction
    }
}

pub fn systolic_peaks(x: &[f64], params: &ExtractionParams, sample_rate_hz: f64) -> Vec<usize> {
    find_peaks(x, &params.systolic_criteria(sample_rate_hz))
}

pub fn diastolic_points(x: &[f64], params: &ExtractionParams, sample_rate_hz: f64) -> Vec<usize> {
    find_troughs(x, &params.diastolic_criteria(sample_rate_hz))
}

/// Nearest diastolic points strictly before and strictly after `systolic`.
/// `diastolic` must be ascending.
pub fn surrounding_diastolic(
    diastolic: &[usize],
    systolic: usize,
) -> (Option<usize>, Option<usize>) {
    let before = diastolic
        .partition_point(|&d| d < systolic)
        .checked_sub(1)
        .map(|i| diastolic[i]);
    let after = diastolic
        .get(diastolic.partition_point(|&d| d <= systolic))
        .copied();
    (before, after)
}

/// First local minimum of `x[systolic..after)`.
pub fn locate_notch(
    x: &[f64],
    systolic: usize,
    after: usize,
    criteria: &PeakCriteria,
) -> Option<usize> {
    let segment = x.get(systolic..after)?;
    first_trough(segment, criteria).map(|i| systolic + i)
}

/// First local maximum of `x[notch..after)`.
pub fn locate_dicrotic_peak(
    x: &[f64],
    notch: usize,
    after: usize,
    criteria: &PeakCriteria,
) -> Option<usize> {
    let segment = x.get(notch..after)?;
    first_peak(segment, criteria).map(|i| notch + i)
}

fn resolve_pulse(
    x: &[f64],
    sample_rate_hz: f64,
    systolic: usize,
    next_systolic: usize,
    diastolic: &[usize],
    dicrotic: &PeakCriteria,
) -> Result<ExtractedPulse, RejectReason> {
    let (before, after) = surrounding_diastolic(diastolic, systolic);
    let diastolic_before = before.ok_or(RejectReason::NoDiastolicBefore)?;
    let diastolic_after = after.ok_or(RejectReason::NoDiastolicAfter)?;

    let notch = locate_notch(x, systolic, diastolic_after, dicrotic).ok_or(RejectReason::NoNotch)?;
    let dicrotic_peak = locate_dicrotic_peak(x, notch, diastolic_after, dicrotic)
        .ok_or(RejectReason::NoDicroticPeak)?;

    let fiducials = FiducialPoints {
        diastolic_before,
        systolic,
        notch,
        dicrotic_peak,
        diastolic_after,
    };
    let features = compute_features(x, &fiducials, next_systolic, sample_rate_hz)?;

    Ok(ExtractedPulse {
        features,
        fiducials,
    })
}

/// Eleven features of one pulse. Amplitudes are scaled by 1000 and times
/// reported in milliseconds.
pub fn compute_features(
    x: &[f64],
    fid: &FiducialPoints,
    next_systolic: usize,
    sample_rate_hz: f64,
) -> Result<PulseFeatures, RejectReason> {
    let interval = next_systolic.saturating_sub(fid.systolic);
    if interval == 0 {
        return Err(RejectReason::ZeroPulseInterval);
    }

    let upstroke = &x[fid.diastolic_before..fid.systolic];
    if upstroke.len() < 2 {
        return Err(RejectReason::UpstrokeTooShort);
    }
    let max_step = upstroke
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::NEG_INFINITY, f64::max);

    let dicrotic_amplitude = x[fid.dicrotic_peak];
    if dicrotic_amplitude == 0.0 {
        return Err(RejectReason::ZeroDicroticAmplitude);
    }

    let to_ms = |samples: usize| samples as f64 / sample_rate_hz * 1000.0;

    let features = PulseFeatures {
        heart_rate: 60.0 / (interval as f64 / sample_rate_hz),
        systolic_peak: x[fid.systolic] * 1000.0,
        dicrotic_peak: dicrotic_amplitude * 1000.0,
        diastolic_point1: x[fid.diastolic_before] * 1000.0,
        diastolic_point2: x[fid.diastolic_after] * 1000.0,
        dicrotic_notch: x[fid.notch] * 1000.0,
        max_slope: max_step * sample_rate_hz,
        augmentation_index: x[fid.systolic] / dicrotic_amplitude,
        t1: to_ms(fid.systolic - fid.diastolic_before),
        t2: to_ms(fid.dicrotic_peak - fid.systolic),
        t3: to_ms(fid.diastolic_after - fid.dicrotic_peak),
    };

    if features_to_vector(&features).iter().all(|v| v.is_finite()) {
        Ok(features)
    } else {
        Err(RejectReason::NonFiniteFeature)
    }
}
