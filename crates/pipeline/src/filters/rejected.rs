//! Filter to remove repos the user swiped left on.
//!
//! Runs on the full scored list, before any truncation, so a rejected repo
//! can never take a slot from a valid one.

use crate::traits::Filter;
use anyhow::Result;
use collab::{Candidate, UserContext};

/// Removes candidates found in `UserContext::rejected_repos`.
pub struct RejectedFilter;

impl Filter for RejectedFilter {
    fn name(&self) -> &str {
        "RejectedFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        if context.rejected_repos.is_empty() {
            return Ok(candidates);
        }
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.rejected_repos.contains(&candidate.repo_id))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rejected_filter() {
        let rejected: HashSet<String> = ["r1", "r3"].into_iter().map(String::from).collect();
        let context = UserContext::new("u1").with_rejected(rejected);

        let candidates = vec![
            Candidate::new("r1", 0.9),
            Candidate::new("r2", 0.8),
            Candidate::new("r3", 0.7),
            Candidate::new("r4", 0.6),
        ];

        let filtered = RejectedFilter.apply(candidates, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].repo_id, "r2");
        assert_eq!(filtered[1].repo_id, "r4");
    }

    #[test]
    fn test_no_rejections_keeps_everything() {
        let context = UserContext::new("u1");
        let candidates = vec![Candidate::new("r1", 0.9), Candidate::new("r2", 0.8)];

        let filtered = RejectedFilter.apply(candidates.clone(), &context).unwrap();
        assert_eq!(filtered, candidates);
    }
}
