pub mod correction;
pub mod engine;
pub mod hypothesis;
pub mod percentile;
pub mod summary;
