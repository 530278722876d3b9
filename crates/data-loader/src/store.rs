//! The data-access boundary the recommender consumes.
//!
//! Production deployments back this with the application database; the
//! in-memory [`InteractionIndex`] implements it for the CLI and for tests.

use crate::error::StoreResult;
use crate::types::{Interaction, InteractionIndex, RepoId};
use std::collections::{HashMap, HashSet};

/// Read access to interactions and the text attached to users and repos.
///
/// Implementations may block on I/O. Callers on an async runtime should run
/// them on a blocking thread and bound them with a timeout.
pub trait InteractionStore: Send + Sync {
    /// Every (user, repo, signal) observation
    fn list_interactions(&self) -> StoreResult<Vec<Interaction>>;

    /// Profile text for a user, empty when the user or their profile is unknown
    fn get_user_text(&self, user_id: &str) -> StoreResult<String>;

    /// Description per repository; unknown ids are left out of the map
    fn get_item_texts(&self, repo_ids: &[RepoId]) -> StoreResult<HashMap<RepoId, String>>;

    /// Repositories the user explicitly rejected
    fn get_rejected_items(&self, user_id: &str) -> StoreResult<HashSet<RepoId>>;

    /// Feedback the user left on a repository, if any
    fn get_feedback_reason(&self, user_id: &str, repo_id: &str) -> StoreResult<Option<String>>;
}

impl InteractionStore for InteractionIndex {
    fn list_interactions(&self) -> StoreResult<Vec<Interaction>> {
        Ok(self.interactions().to_vec())
    }

    fn get_user_text(&self, user_id: &str) -> StoreResult<String> {
        Ok(self
            .get_user(user_id)
            .map(|user| user.profile_text())
            .unwrap_or_default())
    }

    fn get_item_texts(&self, repo_ids: &[RepoId]) -> StoreResult<HashMap<RepoId, String>> {
        Ok(repo_ids
            .iter()
            .filter_map(|id| {
                self.get_repo(id)
                    .map(|repo| (id.clone(), repo.description.clone()))
            })
            .collect())
    }

    fn get_rejected_items(&self, user_id: &str) -> StoreResult<HashSet<RepoId>> {
        Ok(self.rejected_repos(user_id))
    }

    fn get_feedback_reason(&self, user_id: &str, repo_id: &str) -> StoreResult<Option<String>> {
        Ok(self.feedback_reason(user_id, repo_id).map(str::to_string))
    }
}
