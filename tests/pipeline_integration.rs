use ppg_bp::application::dsp::BandpassFilter;
use ppg_bp::application::ml::{BpPredictor, LinearBpScorer, LinearHead, StandardScaler};
use ppg_bp::application::processor::{PulseSelection, SignalProcessor};
use ppg_bp::application::pulse_extractor::{ExtractionParams, PulseFeatureExtractor};
use ppg_bp::domain::errors::{PipelineError, ScorerError};
use ppg_bp::domain::ml::feature_registry::{FEATURE_COUNT, features_to_vector};
use ppg_bp::domain::ports::BpScorer;
use ppg_bp::domain::pulse::BpEstimate;
use ppg_bp::domain::signal::Signal;
use ppg_bp::infrastructure::observability::PipelineMetrics;
use ppg_bp::infrastructure::simulation::SyntheticPpg;
use std::sync::Arc;

const FS: f64 = 125.0;

// --- Mocks ---

/// SBP = 2 x heart rate, DBP = 80 regardless of input.
struct MockScorer;

impl BpScorer for MockScorer {
    fn standardize(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        assert_eq!(features.len(), FEATURE_COUNT);
        Ok(features.to_vec())
    }

    fn predict_sbp(&self, standardized: &[f64]) -> Result<f64, ScorerError> {
        Ok(2.0 * standardized[0])
    }

    fn predict_dbp(&self, _standardized: &[f64]) -> Result<f64, ScorerError> {
        Ok(80.0)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct UnavailableScorer;

impl BpScorer for UnavailableScorer {
    fn standardize(&self, _features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        Err(ScorerError::ModelUnavailable {
            reason: "not loaded".to_string(),
        })
    }

    fn predict_sbp(&self, _standardized: &[f64]) -> Result<f64, ScorerError> {
        Err(ScorerError::ModelUnavailable {
            reason: "not loaded".to_string(),
        })
    }

    fn predict_dbp(&self, _standardized: &[f64]) -> Result<f64, ScorerError> {
        Err(ScorerError::ModelUnavailable {
            reason: "not loaded".to_string(),
        })
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

fn filtered(samples: Vec<f64>) -> Signal {
    let raw = Signal::new(samples, FS).unwrap();
    BandpassFilter::default().apply(&raw).unwrap()
}

#[test]
fn test_synthetic_recording_end_to_end() {
    let samples = SyntheticPpg::default().generate(FS, 10.0);

    let pulses = PulseFeatureExtractor::default().extract(&filtered(samples.clone()));
    assert_eq!(pulses.len(), 9);
    for pulse in &pulses {
        assert!(
            (pulse.heart_rate - 60.0).abs() < 5.0,
            "heart rate {}",
            pulse.heart_rate
        );
        assert!(features_to_vector(pulse).iter().all(|v| v.is_finite()));
        assert!(pulse.systolic_peak > pulse.dicrotic_notch);
        assert!(pulse.dicrotic_peak > pulse.dicrotic_notch);
        assert!(pulse.t1 > 0.0 && pulse.t2 > 0.0 && pulse.t3 > 0.0);
    }

    let processor = SignalProcessor::new(BpPredictor::new(Arc::new(MockScorer)));
    let estimate = processor.process_signal(&samples, FS).unwrap();
    assert!(estimate.is_measurement());
    assert!((estimate.systolic - 120.0).abs() < 10.0);
    assert_eq!(estimate.diastolic, 80.0);
}

#[test]
fn test_extraction_is_deterministic_on_noisy_input() {
    let samples = SyntheticPpg::default()
        .with_noise(0.005, 11)
        .generate(FS, 10.0);
    let signal = filtered(samples);
    let extractor = PulseFeatureExtractor::default();

    let first = extractor.extract_detailed(&signal);
    let second = extractor.extract_detailed(&signal);
    assert_eq!(first, second);
    for pulse in &first.pulses {
        assert!(pulse.fiducials.is_ordered());
    }
}

#[test]
fn test_flat_line_is_empty_not_error() {
    let processor = SignalProcessor::new(BpPredictor::new(Arc::new(MockScorer)));
    assert_eq!(processor.process_signal(&vec![0.8; 1250], FS), None);
    assert_eq!(processor.try_process(&vec![0.8; 1250], FS), Ok(None));
}

#[test]
fn test_unavailable_model_yields_sentinel() {
    let samples = SyntheticPpg::default().generate(FS, 10.0);
    let processor = SignalProcessor::new(BpPredictor::new(Arc::new(UnavailableScorer)));

    assert_eq!(
        processor.process_signal(&samples, FS),
        Some(BpEstimate::SENTINEL)
    );
    assert!(matches!(
        processor.try_process(&samples, FS),
        Err(PipelineError::Scorer(ScorerError::ModelUnavailable { .. }))
    ));
}

#[test]
fn test_strict_thresholds_reject_everything() {
    let samples = SyntheticPpg::default().generate(FS, 10.0);
    let extractor = PulseFeatureExtractor::new(ExtractionParams {
        systolic_prominence: 10.0,
        ..ExtractionParams::default()
    });
    let processor = SignalProcessor::new(BpPredictor::new(Arc::new(MockScorer)))
        .with_extractor(extractor);
    assert_eq!(processor.process_signal(&samples, FS), None);
}

#[test]
fn test_linear_scorer_pipeline_with_metrics() {
    let scorer = LinearBpScorer::new(
        StandardScaler::identity(),
        LinearHead::constant(118.0),
        LinearHead::constant(76.0),
    );
    let metrics = PipelineMetrics::new().unwrap();
    let processor = SignalProcessor::new(BpPredictor::new(Arc::new(scorer)))
        .with_selection(PulseSelection::Median)
        .with_metrics(metrics.clone());

    let signals = vec![
        SyntheticPpg::default().generate(FS, 10.0),
        vec![0.0; 5],
        SyntheticPpg::default().with_noise(0.002, 3).generate(FS, 10.0),
    ];
    let results = processor.process_batch(&signals, FS);
    assert_eq!(results[0], Some(BpEstimate::new(118.0, 76.0)));
    assert_eq!(results[1], Some(BpEstimate::SENTINEL));
    assert_eq!(results[2], Some(BpEstimate::new(118.0, 76.0)));

    let rendered = metrics.render();
    assert!(rendered.contains("ppg_bp_signals_processed_total{outcome=\"estimate\"} 2"));
    assert!(rendered.contains("ppg_bp_signals_processed_total{outcome=\"error\"} 1"));
}
