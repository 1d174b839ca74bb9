use thiserror::Error;

/// Errors related to signal construction and filtering
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("Signal too short: {len} samples, filter needs more than {required}")]
    SignalTooShort { len: usize, required: usize },
}

impl SignalError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SignalError::InvalidParameter {
            reason: reason.into(),
        }
    }
}

/// Errors raised by a blood pressure scorer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScorerError {
    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Malformed feature vector: {reason}")]
    MalformedVector { reason: String },

    #[error("Prediction failed: {reason}")]
    PredictionFailed { reason: String },
}

/// Errors related to cardiovascular risk scoring
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid risk input: {reason}")]
    InvalidInput { reason: String },
}

/// Any fault that aborts the filter → extract → predict pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Signal stage failed: {0}")]
    Signal(#[from] SignalError),

    #[error("Scorer stage failed: {0}")]
    Scorer(#[from] ScorerError),
}
