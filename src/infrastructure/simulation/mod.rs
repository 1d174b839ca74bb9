pub mod ppg_generator;

pub use ppg_generator::SyntheticPpg;
