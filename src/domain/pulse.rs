use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample indices of the landmarks that delimit one cardiac pulse.
///
/// Always strictly increasing:
/// `diastolic_before < systolic < notch < dicrotic_peak < diastolic_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiducialPoints {
    pub diastolic_before: usize,
    pub systolic: usize,
    pub notch: usize,
    pub dicrotic_peak: usize,
    pub diastolic_after: usize,
}

impl FiducialPoints {
    pub fn is_ordered(&self) -> bool {
        self.diastolic_before < self.systolic
            && self.systolic < self.notch
            && self.notch < self.dicrotic_peak
            && self.dicrotic_peak < self.diastolic_after
    }
}

/// Morphological features of a single pulse.
///
/// Amplitudes are in filtered-signal units x1000, times in milliseconds,
/// heart rate in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PulseFeatures {
    pub heart_rate: f64,
    pub systolic_peak: f64,
    pub dicrotic_peak: f64,
    pub diastolic_point1: f64,
    pub diastolic_point2: f64,
    pub dicrotic_notch: f64,
    pub max_slope: f64,
    pub augmentation_index: f64,
    #[serde(rename = "T1")]
    pub t1: f64,
    #[serde(rename = "T2")]
    pub t2: f64,
    #[serde(rename = "T3")]
    pub t3: f64,
}

/// Features together with the landmarks they were computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedPulse {
    pub features: PulseFeatures,
    pub fiducials: FiducialPoints,
}

/// Systolic / diastolic pressure in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpEstimate {
    pub systolic: f64,
    pub diastolic: f64,
}

impl BpEstimate {
    /// Returned when the pipeline faulted. Means "no measurement", never a reading of zero.
    pub const SENTINEL: BpEstimate = BpEstimate {
        systolic: 0.0,
        diastolic: 0.0,
    };

    pub fn new(systolic: f64, diastolic: f64) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }

    pub fn is_measurement(&self) -> bool {
        self.systolic.is_finite()
            && self.diastolic.is_finite()
            && !(self.systolic == 0.0 && self.diastolic == 0.0)
    }
}

impl fmt::Display for BpEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}/{:.0} mmHg", self.systolic, self.diastolic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_not_a_measurement() {
        assert!(!BpEstimate::SENTINEL.is_measurement());
        assert!(!BpEstimate::new(f64::NAN, 80.0).is_measurement());
        assert!(BpEstimate::new(121.4, 79.6).is_measurement());
    }

    #[test]
    fn test_fiducial_ordering() {
        let points = FiducialPoints {
            diastolic_before: 10,
            systolic: 30,
            notch: 55,
            dicrotic_peak: 62,
            diastolic_after: 110,
        };
        assert!(points.is_ordered());

        let broken = FiducialPoints {
            notch: 70,
            ..points
        };
        assert!(!broken.is_ordered());
    }

    #[test]
    fn test_time_features_serialize_uppercase() {
        let json = serde_json::to_string(&PulseFeatures::default()).unwrap();
        assert!(json.contains("\"T1\""));
        assert!(json.contains("\"augmentation_index\""));
    }

    #[test]
    fn test_display() {
        assert_eq!(BpEstimate::new(120.4, 80.6).to_string(), "120/81 mmHg");
    }
}
