//! The trained latent-factor model.
//!
//! Affinity of user `u` for item `i` is `p_u · q_i + b_i`: the dot product of
//! their factor rows plus a per-item bias. Factor matrices are stored
//! row-major in flat vectors.

use crate::mapping::IdMapping;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    factors: usize,
    users: IdMapping,
    items: IdMapping,
    user_factors: Vec<f32>,
    item_factors: Vec<f32>,
    item_bias: Vec<f32>,
}

impl FactorModel {
    pub(crate) fn new(
        factors: usize,
        users: IdMapping,
        items: IdMapping,
        user_factors: Vec<f32>,
        item_factors: Vec<f32>,
        item_bias: Vec<f32>,
    ) -> Self {
        Self {
            factors,
            users,
            items,
            user_factors,
            item_factors,
            item_bias,
        }
    }

    /// Latent dimension
    pub fn factors(&self) -> usize {
        self.factors
    }

    pub fn users(&self) -> &IdMapping {
        &self.users
    }

    pub fn items(&self) -> &IdMapping {
        &self.items
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn user_vector(&self, user_idx: usize) -> &[f32] {
        let start = user_idx * self.factors;
        &self.user_factors[start..start + self.factors]
    }

    pub fn item_vector(&self, item_idx: usize) -> &[f32] {
        let start = item_idx * self.factors;
        &self.item_factors[start..start + self.factors]
    }

    pub fn item_bias(&self, item_idx: usize) -> f32 {
        self.item_bias[item_idx]
    }

    /// Score by dense indices. Callers guarantee the indices are in range.
    pub fn predict_index(&self, user_idx: usize, item_idx: usize) -> f32 {
        dot(self.user_vector(user_idx), self.item_vector(item_idx)) + self.item_bias(item_idx)
    }

    /// Score a (user, repo) pair by id; `None` when either id was not trained
    pub fn score_pair(&self, user_id: &str, repo_id: &str) -> Option<f32> {
        let user_idx = self.users.get_index(user_id)?;
        let item_idx = self.items.get_index(repo_id)?;
        Some(self.predict_index(user_idx, item_idx))
    }

    /// Verify the matrices agree with the mappings.
    ///
    /// Deserialized artifacts go through this before they are served.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.factors == 0 {
            return Err("model has zero latent factors".to_string());
        }
        let expected_users = self.users.len() * self.factors;
        if self.user_factors.len() != expected_users {
            return Err(format!(
                "user factor matrix has {} values, expected {}",
                self.user_factors.len(),
                expected_users
            ));
        }
        let expected_items = self.items.len() * self.factors;
        if self.item_factors.len() != expected_items {
            return Err(format!(
                "item factor matrix has {} values, expected {}",
                self.item_factors.len(),
                expected_items
            ));
        }
        if self.item_bias.len() != self.items.len() {
            return Err(format!(
                "item bias vector has {} values, expected {}",
                self.item_bias.len(),
                self.items.len()
            ));
        }
        Ok(())
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
