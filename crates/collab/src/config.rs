//! Hyperparameters for training the CF model.

use crate::error::{CfError, Result};
use data_loader::Signal;
use serde::{Deserialize, Serialize};

/// Training hyperparameters.
///
/// Defaults: 20 epochs on 2 threads with +1/-1
/// interaction weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Latent dimension of user and item factors
    pub factors: usize,
    pub epochs: usize,
    /// AdaGrad base step size
    pub learning_rate: f32,
    /// L2 penalty on factors and item biases
    pub regularization: f32,
    /// Size of the rayon pool used for factor updates
    pub threads: usize,
    pub seed: u64,
    /// Weight of a positive (saved / right swipe) interaction
    pub positive_weight: f32,
    /// Weight of a negative (left swipe) interaction
    pub negative_weight: f32,
    /// Probability of drawing the sampled negative from the user's explicit rejections
    pub hard_negative_rate: f64,
    /// Negative samples drawn per positive interaction and epoch
    pub negatives_per_positive: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            factors: 32,
            epochs: 20,
            learning_rate: 0.05,
            regularization: 0.01,
            threads: 2,
            seed: 42,
            positive_weight: 1.0,
            negative_weight: -1.0,
            hard_negative_rate: 0.5,
            negatives_per_positive: 1,
        }
    }
}

impl TrainingConfig {
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_weights(mut self, positive: f32, negative: f32) -> Self {
        self.positive_weight = positive;
        self.negative_weight = negative;
        self
    }

    pub fn with_hard_negative_rate(mut self, rate: f64) -> Self {
        self.hard_negative_rate = rate;
        self
    }

    pub fn with_negatives_per_positive(mut self, count: usize) -> Self {
        self.negatives_per_positive = count;
        self
    }

    /// Numeric weight of a signal
    pub fn signal_weight(&self, signal: Signal) -> f32 {
        match signal {
            Signal::Positive => self.positive_weight,
            Signal::Negative => self.negative_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(CfError::InvalidConfig(reason));

        if self.factors == 0 {
            return invalid("factors must be at least 1".to_string());
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1".to_string());
        }
        if self.threads == 0 {
            return invalid("threads must be at least 1".to_string());
        }
        if self.negatives_per_positive == 0 {
            return invalid("negatives_per_positive must be at least 1".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return invalid(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            ));
        }
        if !(0.0..=1.0).contains(&self.hard_negative_rate) {
            return invalid(format!(
                "hard_negative_rate must be within [0, 1], got {}",
                self.hard_negative_rate
            ));
        }
        if !(self.positive_weight.is_finite() && self.negative_weight.is_finite()) {
            return invalid("interaction weights must be finite".to_string());
        }
        if self.positive_weight <= 0.0 {
            return invalid(format!(
                "positive_weight must be positive, got {}",
                self.positive_weight
            ));
        }
        if self.positive_weight <= self.negative_weight {
            return invalid(format!(
                "positive_weight ({}) must exceed negative_weight ({})",
                self.positive_weight, self.negative_weight
            ));
        }
        Ok(())
    }
}
