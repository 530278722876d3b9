//! Filter implementations for the candidate pipeline.

pub mod dedup;
pub mod rejected;

pub use dedup::DedupFilter;
pub use rejected::RejectedFilter;
