use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pulse::BpEstimate;

/// A stored blood pressure measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpReading {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub systolic: i32,
    pub diastolic: i32,
}

impl BpReading {
    pub fn new(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            systolic,
            diastolic,
        }
    }

    /// Rounds an estimate to whole mmHg.
    pub fn from_estimate(timestamp: DateTime<Utc>, estimate: &BpEstimate) -> Self {
        Self::new(
            timestamp,
            estimate.systolic.round() as i32,
            estimate.diastolic.round() as i32,
        )
    }
}
