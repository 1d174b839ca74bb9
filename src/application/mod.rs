// Filtering and peak search
pub mod dsp;

// Fiducial point search and feature computation
pub mod pulse_extractor;

// Scorer adapters and the predictor
pub mod ml;

// Pipeline orchestrator
pub mod processor;

// Streaming front-end over the orchestrator
pub mod monitor;
