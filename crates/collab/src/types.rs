//! Request-scoped types shared by the scorer and the filter pipeline.

use data_loader::{RepoId, UserId};
use std::collections::HashSet;

/// A repository with its CF affinity score for one user
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub repo_id: RepoId,
    pub score: f32,
}

impl Candidate {
    pub fn new(repo_id: impl Into<RepoId>, score: f32) -> Self {
        Self {
            repo_id: repo_id.into(),
            score,
        }
    }
}

/// What the filters need to know about the requesting user.
///
/// Built fresh for every request from the live interaction store, so a new
/// rejection takes effect without retraining.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    pub rejected_repos: HashSet<RepoId>,
}

impl UserContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            rejected_repos: HashSet::new(),
        }
    }

    pub fn with_rejected(mut self, rejected: HashSet<RepoId>) -> Self {
        self.rejected_repos = rejected;
        self
    }
}
