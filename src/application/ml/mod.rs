pub mod linear_scorer;
pub mod predictor;
pub mod scaler;
pub mod smartcore_scorer;

pub use linear_scorer::{LinearBpScorer, LinearHead};
pub use predictor::BpPredictor;
pub use scaler::StandardScaler;
pub use smartcore_scorer::SmartCoreBpScorer;
