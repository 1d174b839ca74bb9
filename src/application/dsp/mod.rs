//! Signal conditioning primitives: band-pass filtering and peak search.

pub mod bandpass;
pub mod peaks;

pub use bandpass::BandpassFilter;
pub use peaks::{PeakCriteria, find_peaks, find_troughs};
