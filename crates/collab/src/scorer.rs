//! Candidate Scorer - CF affinity over the whole repo universe
//!
//! Every repository the model knows is scored for the user and the list comes
//! back sorted: descending score, ascending repo id on ties. Nothing is
//! excluded or truncated here; the filter pipeline does that afterwards.

use crate::error::{CfError, Result};
use crate::model::FactorModel;
use crate::types::Candidate;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

/// Universes smaller than this are scored on the calling thread
const PARALLEL_THRESHOLD: usize = 2048;

#[derive(Debug, Clone)]
pub struct CandidateScorer {
    parallel_threshold: usize,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateScorer {
    pub fn new() -> Self {
        Self {
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }

    /// Configure the universe size above which scoring fans out to rayon
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Score all repos for `user_id`, failing with [`CfError::UnknownUser`]
    /// when the user was not part of training.
    #[instrument(skip(self, model))]
    pub fn try_score(&self, user_id: &str, model: &FactorModel) -> Result<Vec<Candidate>> {
        let user_idx = model
            .users()
            .get_index(user_id)
            .ok_or_else(|| CfError::UnknownUser(user_id.to_string()))?;

        let score_item = |(item_idx, repo_id): (usize, &String)| {
            Candidate::new(repo_id.clone(), model.predict_index(user_idx, item_idx))
        };

        let ids = model.items().ids();
        let mut candidates: Vec<Candidate> = if ids.len() >= self.parallel_threshold {
            ids.par_iter().enumerate().map(score_item).collect()
        } else {
            ids.iter().enumerate().map(score_item).collect()
        };

        candidates.sort_by(by_score_then_id);

        debug!(candidates = candidates.len(), "Scored repo universe");
        Ok(candidates)
    }

    /// Like [`try_score`](Self::try_score), but an unknown user yields an
    /// empty list instead of an error.
    pub fn score(&self, user_id: &str, model: &FactorModel) -> Vec<Candidate> {
        match self.try_score(user_id, model) {
            Ok(candidates) => candidates,
            Err(e) => {
                info!(user_id, reason = %e, "No CF candidates for user");
                Vec::new()
            }
        }
    }
}

/// Descending score, ascending repo id on ties. `+ 0.0` folds `-0.0` into
/// `0.0` so equal scores always reach the id tie break.
fn by_score_then_id(a: &Candidate, b: &Candidate) -> Ordering {
    (b.score + 0.0)
        .total_cmp(&(a.score + 0.0))
        .then_with(|| a.repo_id.cmp(&b.repo_id))
}
