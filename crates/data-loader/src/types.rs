//! Core domain types for users, repositories and swipe interactions.
//!
//! Everything here is read-only from the recommender's point of view: an
//! external system creates users, repositories and interactions, and the
//! recommender only reads them through [`InteractionIndex`] or any other
//! [`InteractionStore`](crate::store::InteractionStore).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable, string-comparable user key
pub type UserId = String;

/// Stable, string-comparable repository key
pub type RepoId = String;

// =============================================================================
// User
// =============================================================================

/// A user profile as captured during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name
    pub username: String,
    /// Programming languages the user works in
    pub languages: Vec<String>,
    /// Free-form skill tags ("beginner", "backend", ...)
    pub skills: Vec<String>,
    /// Topics the user asked to see more of
    pub preference_tags: Vec<String>,
}

impl User {
    /// Free-text profile used for semantic reranking.
    ///
    /// Display name, languages, skills and preference tags joined by single
    /// spaces. Blank parts are dropped, so a user with nothing filled in
    /// yields an empty string.
    pub fn profile_text(&self) -> String {
        std::iter::once(self.username.as_str())
            .chain(self.languages.iter().map(String::as_str))
            .chain(self.skills.iter().map(String::as_str))
            .chain(self.preference_tags.iter().map(String::as_str))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// =============================================================================
// Repository
// =============================================================================

/// An open-source repository that can be recommended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepoId,
    /// `owner/name` style display name
    pub name: String,
    /// Free-text description, the main input to reranking
    pub description: String,
    /// Primary language, when GitHub reports one
    pub language: Option<String>,
    /// Topic tags
    pub tags: Vec<String>,
}

// =============================================================================
// Interaction
// =============================================================================

/// Direction of a user's reaction to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Saved, liked or swiped right
    Positive,
    /// Explicitly rejected (swiped left)
    Negative,
}

impl Signal {
    pub fn is_positive(self) -> bool {
        matches!(self, Signal::Positive)
    }
}

/// One observed (user, repo, signal) event.
///
/// The same pair can show up more than once; consumers treat repeats as
/// reinforcement rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub repo_id: RepoId,
    pub signal: Signal,
    /// Optional free text left alongside the swipe
    pub feedback_reason: Option<String>,
}

impl Interaction {
    pub fn new(user_id: impl Into<UserId>, repo_id: impl Into<RepoId>, signal: Signal) -> Self {
        Self {
            user_id: user_id.into(),
            repo_id: repo_id.into(),
            signal,
            feedback_reason: None,
        }
    }

    /// Attach a feedback reason (builder style)
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.feedback_reason = Some(reason.into());
        self
    }
}

// =============================================================================
// InteractionIndex - in-memory store
// =============================================================================

/// Holds all users, repositories and interactions with per-user and
/// per-repo lookups.
#[derive(Debug, Clone, Default)]
pub struct InteractionIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) repos: HashMap<RepoId, Repository>,

    /// Every interaction in insertion order
    pub(crate) interactions: Vec<Interaction>,
    /// Positions in `interactions` made by each user
    pub(crate) user_interactions: HashMap<UserId, Vec<usize>>,
    /// Positions in `interactions` received by each repo
    pub(crate) repo_interactions: HashMap<RepoId, Vec<usize>>,
}

impl InteractionIndex {
    /// Creates a new, empty index
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn get_repo(&self, id: &str) -> Option<&Repository> {
        self.repos.get(id)
    }

    /// All interactions, in insertion order
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Interactions made by a user, in insertion order
    pub fn get_user_interactions(&self, user_id: &str) -> Vec<&Interaction> {
        self.positions_to_interactions(self.user_interactions.get(user_id))
    }

    /// Interactions received by a repository, in insertion order
    pub fn get_repo_interactions(&self, repo_id: &str) -> Vec<&Interaction> {
        self.positions_to_interactions(self.repo_interactions.get(repo_id))
    }

    fn positions_to_interactions(&self, positions: Option<&Vec<usize>>) -> Vec<&Interaction> {
        positions
            .map(|positions| positions.iter().map(|&pos| &self.interactions[pos]).collect())
            .unwrap_or_default()
    }

    /// Repositories the user swiped left on
    pub fn rejected_repos(&self, user_id: &str) -> HashSet<RepoId> {
        self.get_user_interactions(user_id)
            .into_iter()
            .filter(|interaction| !interaction.signal.is_positive())
            .map(|interaction| interaction.repo_id.clone())
            .collect()
    }

    /// Most recent non-blank feedback reason the user left on a repository
    pub fn feedback_reason(&self, user_id: &str, repo_id: &str) -> Option<&str> {
        self.get_user_interactions(user_id)
            .into_iter()
            .rev()
            .filter(|interaction| interaction.repo_id == repo_id)
            .filter_map(|interaction| interaction.feedback_reason.as_deref())
            .map(str::trim)
            .find(|reason| !reason.is_empty())
    }

    /// All user ids, sorted
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// All repository ids, sorted
    pub fn repo_ids(&self) -> Vec<RepoId> {
        let mut ids: Vec<RepoId> = self.repos.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn insert_repo(&mut self, repo: Repository) {
        self.repos.insert(repo.id.clone(), repo);
    }

    /// Append an interaction and update both lookups
    pub fn insert_interaction(&mut self, interaction: Interaction) {
        let position = self.interactions.len();
        self.user_interactions
            .entry(interaction.user_id.clone())
            .or_default()
            .push(position);
        self.repo_interactions
            .entry(interaction.repo_id.clone())
            .or_default()
            .push(position);
        self.interactions.push(interaction);
    }

    /// (users, repos, interactions)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.repos.len(), self.interactions.len())
    }
}
