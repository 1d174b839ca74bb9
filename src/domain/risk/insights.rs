use crate::domain::reading::BpReading;
use crate::domain::risk::cvd_risk::{CvdRiskScorer, mean_pressure};
use serde::Serialize;

/// Mean absolute systolic change (mmHg) above which readings are flagged as variable.
const HIGH_VARIABILITY_MMHG: f64 = 20.0;

/// Coarse classification of the average pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BpClassification {
    /// Below 120/80
    Healthy,
    /// Below 140/90
    Elevated,
    High,
}

impl BpClassification {
    pub fn classify(avg_systolic: i32, avg_diastolic: i32) -> Self {
        if avg_systolic < 120 && avg_diastolic < 80 {
            BpClassification::Healthy
        } else if avg_systolic < 140 && avg_diastolic < 90 {
            BpClassification::Elevated
        } else {
            BpClassification::High
        }
    }

    pub fn action_needed(&self) -> bool {
        matches!(self, BpClassification::High)
    }
}

/// Summary of a reporting window of readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingInsights {
    pub reading_count: usize,
    pub average_systolic: i32,
    pub average_diastolic: i32,
    pub cvd_risk: f64,
    pub systolic_variability: f64,
    pub stress_score: i32,
    pub classification: BpClassification,
    pub high_variability: bool,
}

impl ReadingInsights {
    /// Returns `None` when there is nothing to analyze.
    pub fn analyze(readings: &[BpReading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let systolic: Vec<i32> = readings.iter().map(|r| r.systolic).collect();
        let diastolic: Vec<i32> = readings.iter().map(|r| r.diastolic).collect();
        // Averages are truncated to whole mmHg before scoring.
        let average_systolic = mean_pressure(&systolic, "systolic").ok()? as i32;
        let average_diastolic = mean_pressure(&diastolic, "diastolic").ok()? as i32;

        let cvd_risk = CvdRiskScorer::new()
            .score_averages(f64::from(average_systolic), f64::from(average_diastolic));

        let systolic_variability = systolic_variability(readings);
        let stress_score = ((systolic_variability * 2.0) as i32).clamp(0, 100);

        Some(Self {
            reading_count: readings.len(),
            average_systolic,
            average_diastolic,
            cvd_risk,
            systolic_variability,
            stress_score,
            classification: BpClassification::classify(average_systolic, average_diastolic),
            high_variability: readings.len() >= 2 && systolic_variability > HIGH_VARIABILITY_MMHG,
        })
    }
}

/// Mean absolute difference between consecutive systolic readings.
fn systolic_variability(readings: &[BpReading]) -> f64 {
    if readings.len() < 2 {
        return 0.0;
    }
    let total: f64 = readings
        .windows(2)
        .map(|w| f64::from((w[0].systolic - w[1].systolic).abs()))
        .sum();
    total / (readings.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn readings(values: &[(i32, i32)]) -> Vec<BpReading> {
        let start = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &(s, d))| BpReading::new(start + Duration::hours(i as i64), s, d))
            .collect()
    }

    #[test]
    fn test_empty_has_no_insights() {
        assert!(ReadingInsights::analyze(&[]).is_none());
    }

    #[test]
    fn test_averages_truncate_toward_zero() {
        let insights = ReadingInsights::analyze(&readings(&[(119, 79), (120, 80)])).unwrap();
        // 119.5 / 79.5 truncate to a healthy 119/79.
        assert_eq!(insights.average_systolic, 119);
        assert_eq!(insights.average_diastolic, 79);
        assert_eq!(insights.classification, BpClassification::Healthy);
        assert_eq!(insights.cvd_risk, 0.0);
    }

    #[test]
    fn test_healthy_steady_readings() {
        let insights =
            ReadingInsights::analyze(&readings(&[(112, 72), (114, 74), (113, 73)])).unwrap();
        assert_eq!(insights.average_systolic, 113);
        assert_eq!(insights.average_diastolic, 73);
        assert_eq!(insights.cvd_risk, 0.0);
        assert_eq!(insights.classification, BpClassification::Healthy);
        assert!(!insights.high_variability);
        // |112-114| + |114-113| = 3 over 2 steps
        assert!((insights.systolic_variability - 1.5).abs() < 1e-9);
        assert_eq!(insights.stress_score, 3);
    }

    #[test]
    fn test_variable_high_readings() {
        let insights =
            ReadingInsights::analyze(&readings(&[(150, 95), (120, 85), (175, 100)])).unwrap();
        assert_eq!(insights.classification, BpClassification::High);
        assert!(insights.classification.action_needed());
        // (30 + 55) / 2 = 42.5
        assert!(insights.high_variability);
        assert_eq!(insights.stress_score, 85);
    }

    #[test]
    fn test_stress_score_is_clamped() {
        let insights = ReadingInsights::analyze(&readings(&[(100, 70), (200, 70)])).unwrap();
        assert_eq!(insights.stress_score, 100);
    }

    #[test]
    fn test_classification_bounds() {
        assert_eq!(BpClassification::classify(119, 79), BpClassification::Healthy);
        assert_eq!(BpClassification::classify(120, 79), BpClassification::Elevated);
        assert_eq!(BpClassification::classify(139, 89), BpClassification::Elevated);
        assert_eq!(BpClassification::classify(139, 90), BpClassification::High);
    }
}
