//! BPR matrix factorization trainer.
//!
//! ## Algorithm
//! 1. Map user and repo ids to dense indices (ascending id order)
//! 2. Collapse interactions into a sparse matrix; duplicate (user, repo)
//!    observations sum their weights
//! 3. Every epoch, pair each positive (u, i) with a sampled non-positive j,
//!    preferring the user's explicit rejections
//! 4. Take one synchronous AdaGrad step on ln σ(x_ui - x_uj) for every user
//!    row and every item row, in parallel on a fixed-size rayon pool
//!
//! Sampling is sequential from a seeded RNG and each parallel update only
//! reads the previous epoch's factors, so a given seed produces the same
//! model no matter how many threads run it.

use crate::config::TrainingConfig;
use crate::error::{CfError, Result};
use crate::mapping::IdMapping;
use crate::model::{FactorModel, dot};
use data_loader::{Interaction, Signal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Uniform draws attempted before giving up on finding a non-positive item
const MAX_NEGATIVE_DRAWS: usize = 16;

/// Seed for the AdaGrad accumulators; keeps the denominator non-zero
const ADAGRAD_INIT: f32 = 1e-6;

/// Train a model on the full interaction set.
///
/// Fails with [`CfError::InsufficientData`] when there are no interactions
/// at all, or none of them is positive.
#[instrument(skip(interactions, config), fields(interactions = interactions.len()))]
pub fn train(interactions: &[Interaction], config: &TrainingConfig) -> Result<FactorModel> {
    config.validate()?;

    if interactions.is_empty() {
        return Err(CfError::InsufficientData(
            "no interactions to train on".to_string(),
        ));
    }

    let users = IdMapping::from_ids(interactions.iter().map(|i| i.user_id.as_str()));
    let items = IdMapping::from_ids(interactions.iter().map(|i| i.repo_id.as_str()));
    let matrix = InteractionMatrix::build(interactions, &users, &items, config);

    if matrix.num_positives() == 0 {
        return Err(CfError::InsufficientData(
            "interactions contain no positive signal".to_string(),
        ));
    }

    info!(
        users = users.len(),
        repos = items.len(),
        positives = matrix.num_positives(),
        factors = config.factors,
        epochs = config.epochs,
        threads = config.threads,
        "Training CF model"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| CfError::ThreadPool(e.to_string()))?;

    let start = Instant::now();
    let state = pool.install(|| {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut state = FactorState::init(users.len(), items.len(), config.factors, &mut rng);

        for epoch in 0..config.epochs {
            match state.run_epoch(&matrix, config, &mut rng) {
                Some(loss) => debug!(epoch, loss, "BPR epoch complete"),
                None => debug!(epoch, "No training pairs could be drawn"),
            }
        }
        state
    });

    info!(elapsed = ?start.elapsed(), "CF model trained");
    Ok(state.into_model(config.factors, users, items))
}

// =============================================================================
// Sparse interaction matrix
// =============================================================================

struct InteractionMatrix {
    num_items: usize,
    /// Per user: (item, summed weight) for positive cells, sorted by item
    positives: Vec<Vec<(usize, f32)>>,
    /// Per user: explicitly rejected items, sorted
    negatives: Vec<Vec<usize>>,
}

#[derive(Default)]
struct Cell {
    weight: f32,
    has_positive: bool,
}

impl InteractionMatrix {
    fn build(
        interactions: &[Interaction],
        users: &IdMapping,
        items: &IdMapping,
        config: &TrainingConfig,
    ) -> Self {
        // BTreeMap keeps (user, item) order, so every per-user list comes out sorted
        let mut cells: BTreeMap<(usize, usize), Cell> = BTreeMap::new();
        for interaction in interactions {
            let (Some(user), Some(item)) = (
                users.get_index(&interaction.user_id),
                items.get_index(&interaction.repo_id),
            ) else {
                continue;
            };
            let cell = cells.entry((user, item)).or_default();
            cell.weight += config.signal_weight(interaction.signal);
            cell.has_positive |= interaction.signal == Signal::Positive;
        }

        let mut positives = vec![Vec::new(); users.len()];
        let mut negatives = vec![Vec::new(); users.len()];
        for ((user, item), cell) in cells {
            // A save later contradicted by a rejection nets out to a negative
            if cell.has_positive && cell.weight > 0.0 {
                positives[user].push((item, cell.weight));
            } else {
                negatives[user].push(item);
            }
        }

        Self {
            num_items: items.len(),
            positives,
            negatives,
        }
    }

    fn num_users(&self) -> usize {
        self.positives.len()
    }

    fn num_positives(&self) -> usize {
        self.positives.iter().map(Vec::len).sum()
    }

    fn is_positive(&self, user: usize, item: usize) -> bool {
        self.positives[user]
            .binary_search_by_key(&item, |&(positive, _)| positive)
            .is_ok()
    }

    fn draw_negative(&self, user: usize, config: &TrainingConfig, rng: &mut StdRng) -> Option<usize> {
        let rejected = &self.negatives[user];
        if !rejected.is_empty() && rng.random_bool(config.hard_negative_rate) {
            return Some(rejected[rng.random_range(0..rejected.len())]);
        }
        if self.positives[user].len() >= self.num_items {
            return None;
        }
        (0..MAX_NEGATIVE_DRAWS)
            .map(|_| rng.random_range(0..self.num_items))
            .find(|&item| !self.is_positive(user, item))
    }
}

// =============================================================================
// Training state
// =============================================================================

struct Sample {
    user: usize,
    positive: usize,
    negative: usize,
    weight: f32,
}

struct FactorState {
    factors: usize,
    user_factors: Vec<f32>,
    item_factors: Vec<f32>,
    item_bias: Vec<f32>,
    user_accum: Vec<f32>,
    item_accum: Vec<f32>,
    bias_accum: Vec<f32>,
}

impl FactorState {
    fn init(num_users: usize, num_items: usize, factors: usize, rng: &mut StdRng) -> Self {
        let scale = 1.0 / factors as f32;
        let mut random_matrix = |rows: usize| -> Vec<f32> {
            (0..rows * factors)
                .map(|_| (rng.random::<f32>() - 0.5) * scale)
                .collect()
        };
        let user_factors = random_matrix(num_users);
        let item_factors = random_matrix(num_items);

        Self {
            factors,
            user_accum: vec![ADAGRAD_INIT; user_factors.len()],
            item_accum: vec![ADAGRAD_INIT; item_factors.len()],
            bias_accum: vec![ADAGRAD_INIT; num_items],
            item_bias: vec![0.0; num_items],
            user_factors,
            item_factors,
        }
    }

    fn predict(&self, user: usize, item: usize) -> f32 {
        let k = self.factors;
        dot(
            &self.user_factors[user * k..(user + 1) * k],
            &self.item_factors[item * k..(item + 1) * k],
        ) + self.item_bias[item]
    }

    /// Draw (u, i, j) triples for one epoch. Samples are grouped by user;
    /// the returned ranges index each user's slice of the sample list.
    fn draw_samples(
        matrix: &InteractionMatrix,
        config: &TrainingConfig,
        rng: &mut StdRng,
    ) -> (Vec<Sample>, Vec<Range<usize>>) {
        let mut samples = Vec::with_capacity(matrix.num_positives() * config.negatives_per_positive);
        let mut user_ranges = Vec::with_capacity(matrix.num_users());

        for user in 0..matrix.num_users() {
            let start = samples.len();
            for &(positive, weight) in &matrix.positives[user] {
                for _ in 0..config.negatives_per_positive {
                    if let Some(negative) = matrix.draw_negative(user, config, rng) {
                        samples.push(Sample {
                            user,
                            positive,
                            negative,
                            weight,
                        });
                    }
                }
            }
            user_ranges.push(start..samples.len());
        }

        (samples, user_ranges)
    }

    /// One synchronous gradient step. Returns the mean weighted BPR loss
    /// before the step, or `None` when no pairs could be drawn.
    fn run_epoch(
        &mut self,
        matrix: &InteractionMatrix,
        config: &TrainingConfig,
        rng: &mut StdRng,
    ) -> Option<f32> {
        let (samples, user_ranges) = Self::draw_samples(matrix, config, rng);
        if samples.is_empty() {
            return None;
        }

        // d/dx ln σ(x) = σ(-x), scaled by the positive's confidence
        let terms: Vec<(f32, f32)> = samples
            .par_iter()
            .map(|s| {
                let x = self.predict(s.user, s.positive) - self.predict(s.user, s.negative);
                (s.weight * sigmoid(-x), s.weight * ln_sigmoid(x))
            })
            .collect();
        let loss = -terms.iter().map(|&(_, ll)| ll).sum::<f32>() / samples.len() as f32;

        let mut item_touches: Vec<Vec<(usize, f32)>> = vec![Vec::new(); matrix.num_items];
        for (idx, s) in samples.iter().enumerate() {
            item_touches[s.positive].push((idx, 1.0));
            item_touches[s.negative].push((idx, -1.0));
        }

        let k = self.factors;
        let lr = config.learning_rate;
        let reg = config.regularization;
        let user_snapshot = self.user_factors.clone();
        let FactorState {
            user_factors,
            item_factors,
            item_bias,
            user_accum,
            item_accum,
            bias_accum,
            ..
        } = self;

        // Users: gradient of ln σ(p_u·(q_i - q_j) + b_i - b_j) w.r.t. p_u
        let items_view: &[f32] = &item_factors[..];
        user_factors
            .par_chunks_mut(k)
            .zip(user_accum.par_chunks_mut(k))
            .enumerate()
            .for_each(|(user, (row, accum))| {
                let range = user_ranges[user].clone();
                if range.is_empty() {
                    return;
                }
                let mut grad = vec![0.0f32; k];
                for idx in range {
                    let s = &samples[idx];
                    let coefficient = terms[idx].0;
                    let q_i = &items_view[s.positive * k..(s.positive + 1) * k];
                    let q_j = &items_view[s.negative * k..(s.negative + 1) * k];
                    for ((g, a), b) in grad.iter_mut().zip(q_i).zip(q_j) {
                        *g += coefficient * (a - b);
                    }
                }
                adagrad_step(row, accum, &grad, lr, reg);
            });

        // Items: +p_u for the positive side, -p_u for the sampled negative
        item_factors
            .par_chunks_mut(k)
            .zip(item_accum.par_chunks_mut(k))
            .zip(item_bias.par_iter_mut().zip(bias_accum.par_iter_mut()))
            .enumerate()
            .for_each(|(item, ((row, accum), (bias, bias_acc)))| {
                let touches = &item_touches[item];
                if touches.is_empty() {
                    return;
                }
                let mut grad = vec![0.0f32; k];
                let mut bias_grad = 0.0f32;
                for &(idx, sign) in touches {
                    let s = &samples[idx];
                    let coefficient = sign * terms[idx].0;
                    let p_u = &user_snapshot[s.user * k..(s.user + 1) * k];
                    for (g, p) in grad.iter_mut().zip(p_u) {
                        *g += coefficient * p;
                    }
                    bias_grad += coefficient;
                }
                adagrad_step(row, accum, &grad, lr, reg);
                adagrad_step(
                    std::slice::from_mut(bias),
                    std::slice::from_mut(bias_acc),
                    &[bias_grad],
                    lr,
                    reg,
                );
            });

        Some(loss)
    }

    fn into_model(self, factors: usize, users: IdMapping, items: IdMapping) -> FactorModel {
        FactorModel::new(
            factors,
            users,
            items,
            self.user_factors,
            self.item_factors,
            self.item_bias,
        )
    }
}

/// Gradient ascent with per-coordinate AdaGrad scaling and L2 shrinkage
fn adagrad_step(params: &mut [f32], accum: &mut [f32], grad: &[f32], lr: f32, reg: f32) {
    for ((param, acc), g) in params.iter_mut().zip(accum.iter_mut()).zip(grad) {
        let g = g - reg * *param;
        *acc += g * g;
        *param += lr * g / acc.sqrt();
    }
}

fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// ln σ(x), stable for large |x|
fn ln_sigmoid(x: f32) -> f32 {
    -((-x).max(0.0) + (-x.abs()).exp().ln_1p())
}
