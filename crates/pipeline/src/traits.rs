//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to scored candidates.

use anyhow::Result;
use collab::{Candidate, UserContext};

/// Core trait for filtering candidates.
///
/// Filters take ownership of the scored list and hand back what survives.
/// They must preserve the relative order of the candidates they keep.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - Candidates in score order (takes ownership)
    /// * `context` - Per-request user state, e.g. rejected repos
    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>>;
}
