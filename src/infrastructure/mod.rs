pub mod observability;
pub mod persistence;
pub mod repositories;
pub mod simulation;

pub use observability::PipelineMetrics;
pub use repositories::InMemoryReadingRepository;
