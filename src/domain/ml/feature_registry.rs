use crate::domain::pulse::PulseFeatures;

/// Number of features in a pulse feature vector.
pub const FEATURE_COUNT: usize = 11;

/// Ordered list of feature names.
/// This order MUST match exactly with the order the scorer was fitted with.
/// Any change here is a breaking change for persisted models.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "heart_rate",
    "systolic_peak",
    "dicrotic_peak",
    "diastolic_point1",
    "diastolic_point2",
    "dicrotic_notch",
    "max_slope",
    "augmentation_index",
    "T1",
    "T2",
    "T3",
];

/// Projects pulse features into the fixed scorer order.
pub fn features_to_vector(pf: &PulseFeatures) -> [f64; FEATURE_COUNT] {
    [
        pf.heart_rate,
        pf.systolic_peak,
        pf.dicrotic_peak,
        pf.diastolic_point1,
        pf.diastolic_point2,
        pf.dicrotic_notch,
        pf.max_slope,
        pf.augmentation_index,
        pf.t1,
        pf.t2,
        pf.t3,
    ]
}
