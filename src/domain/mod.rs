// Waveform and per-pulse value types
pub mod pulse;
pub mod signal;

// Stored measurements
pub mod reading;

// Feature layout shared with fitted models
pub mod ml;

// Port interfaces
pub mod ports;

// Cardiovascular risk and reading insights
pub mod risk;

// Domain-specific error types
pub mod errors;
