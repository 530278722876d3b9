//! # Collab Crate
//!
//! Collaborative filtering for repository recommendations: a BPR-trained
//! latent-factor model and the scorer that ranks the repo universe with it.
//!
//! ## Components
//!
//! ### Trainer
//! Pairwise ranking over saved vs. rejected / unseen repos:
//! - Positive and negative swipes become weighted matrix cells
//! - AdaGrad updates on a fixed-size rayon pool, deterministic per seed
//!
//! ### Artifact
//! Versioned JSON persistence plus a [`ModelHandle`] that hot-swaps the
//! serving model.
//!
//! ### Candidate Scorer
//! Scores every trained repo for a user, descending, ties by repo id.
//!
//! ## Example Usage
//!
//! ```ignore
//! use collab::{train, save_model, CandidateScorer, ModelHandle, TrainingConfig};
//!
//! let model = train(index.interactions(), &TrainingConfig::default())?;
//! save_model(&model, Path::new("models/cf.json"))?;
//!
//! let handle = ModelHandle::load("models/cf.json")?;
//! let candidates = CandidateScorer::new().score("alice", &handle.current());
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod scorer;
pub mod trainer;
pub mod types;

pub use artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION, ModelHandle, load_model, save_model};
pub use config::TrainingConfig;
pub use error::{CfError, Result};
pub use mapping::IdMapping;
pub use model::FactorModel;
pub use scorer::CandidateScorer;
pub use trainer::train;
pub use types::{Candidate, UserContext};
