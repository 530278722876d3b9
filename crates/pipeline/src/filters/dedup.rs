//! Filter to drop repeated repo ids.
//!
//! Input is in score order, so keeping the first occurrence keeps the
//! highest-scored entry.

use crate::traits::Filter;
use anyhow::Result;
use collab::{Candidate, UserContext};
use std::collections::HashSet;

pub struct DedupFilter;

impl Filter for DedupFilter {
    fn name(&self) -> &str {
        "DedupFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &UserContext) -> Result<Vec<Candidate>> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.repo_id.clone()))
            .collect();
        Ok(filtered)
    }
}
