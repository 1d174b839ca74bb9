pub mod cvd_risk;
pub mod insights;

pub use cvd_risk::CvdRiskScorer;
pub use insights::{BpClassification, ReadingInsights};
