//! Server crate for the repository recommender.
//!
//! This crate contains the orchestrator that composes CF scoring, candidate
//! filtering and semantic reranking into a single request.

pub mod orchestrator;

pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, RecommendationOrchestrator, candidate_text,
    map_texts_to_ids,
};
