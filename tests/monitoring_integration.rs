use chrono::{Duration, TimeZone, Utc};
use ppg_bp::application::ml::{BpPredictor, LinearBpScorer, LinearHead, StandardScaler};
use ppg_bp::application::monitor::{BpMonitor, MonitorSettings};
use ppg_bp::application::processor::SignalProcessor;
use ppg_bp::domain::errors::RiskError;
use ppg_bp::domain::ports::ReadingRepository;
use ppg_bp::domain::reading::BpReading;
use ppg_bp::domain::risk::{BpClassification, CvdRiskScorer, ReadingInsights};
use ppg_bp::infrastructure::InMemoryReadingRepository;
use ppg_bp::infrastructure::persistence::csv_io;
use ppg_bp::infrastructure::simulation::SyntheticPpg;
use std::sync::Arc;

fn constant_processor(systolic: f64, diastolic: f64) -> SignalProcessor {
    let scorer = LinearBpScorer::new(
        StandardScaler::identity(),
        LinearHead::constant(systolic),
        LinearHead::constant(diastolic),
    );
    SignalProcessor::new(BpPredictor::new(Arc::new(scorer)))
}

#[test]
fn test_stream_to_risk() {
    let repo = InMemoryReadingRepository::new();
    let settings = MonitorSettings {
        window_size: 1250,
        sample_interval: 1250,
        ..MonitorSettings::default()
    };
    let mut monitor = BpMonitor::new(
        constant_processor(142.2, 91.0),
        Arc::new(repo.clone()),
        settings,
    );

    let samples = SyntheticPpg::default().generate(125.0, 30.0);
    let readings = monitor.push_batch(&samples).unwrap();
    assert_eq!(readings.len(), 3);
    assert!(readings.iter().all(|r| r.systolic == 142 && r.diastolic == 91));

    // 142 -> 60, 91 -> 60
    let risk = monitor.risk_over_window(Utc::now()).unwrap().unwrap();
    assert_eq!(risk, 60.0);

    let insights = monitor.insights_over_window(Utc::now()).unwrap().unwrap();
    assert_eq!(insights.reading_count, 3);
    assert_eq!(insights.classification, BpClassification::High);
    assert!(insights.classification.action_needed());
    assert!(!insights.high_variability);
}

#[test]
fn test_readings_csv_round_trip_through_repository() {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let readings = vec![
        BpReading::new(base, 118, 79),
        BpReading::new(base + Duration::days(1), 119, 81),
        BpReading::new(base + Duration::days(2), 121, 83),
    ];

    let mut buffer = Vec::new();
    csv_io::write_readings(&mut buffer, &readings).unwrap();
    let loaded = csv_io::read_readings(buffer.as_slice()).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].timestamp, base + Duration::days(2));

    let repo = InMemoryReadingRepository::new();
    repo.save_all(&loaded).unwrap();
    let latest = repo.latest().unwrap().unwrap();
    assert_eq!((latest.systolic, latest.diastolic), (121, 83));

    let window = repo
        .in_range(latest.timestamp - Duration::days(30), latest.timestamp)
        .unwrap();
    let systolic: Vec<i32> = window.iter().map(|r| r.systolic).collect();
    let diastolic: Vec<i32> = window.iter().map(|r| r.diastolic).collect();
    let risk = CvdRiskScorer::new().score(&systolic, &diastolic).unwrap();
    assert!((risk - 10.0).abs() < 1e-9);

    let insights = ReadingInsights::analyze(&window).unwrap();
    assert_eq!(insights.average_systolic, 119);
    assert_eq!(insights.average_diastolic, 81);
    assert_eq!(insights.classification, BpClassification::Elevated);
}

#[test]
fn test_risk_requires_readings() {
    assert!(matches!(
        CvdRiskScorer::new().score(&[], &[]),
        Err(RiskError::InvalidInput { .. })
    ));
}

#[test]
fn test_signal_csv_feeds_pipeline() {
    let samples = SyntheticPpg::default().generate(125.0, 10.0);
    let mut buffer = Vec::new();
    csv_io::write_signal(&mut buffer, &samples, 125.0).unwrap();

    let loaded = csv_io::read_signal(buffer.as_slice()).unwrap();
    assert_eq!(loaded, samples);

    let estimate = constant_processor(120.0, 80.0)
        .process_signal(&loaded, 125.0)
        .unwrap();
    assert!(estimate.is_measurement());
    assert_eq!(estimate.systolic, 120.0);
}
