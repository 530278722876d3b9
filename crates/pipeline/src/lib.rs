//! Post-scoring pipeline for repository candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - Embedders and the SemanticReranker for profile-aware reordering
//!
//! ## Architecture
//! Candidates flow through two stages after CF scoring:
//! 1. Filters remove rejected repos and duplicate ids, preserving score order
//! 2. The reranker reorders a small head of the list by similarity between
//!    the user's profile text and each repo's description
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, HashingEmbedder, SemanticReranker};
//!
//! let filtered = FilterPipeline::standard().apply(candidates, &context)?;
//!
//! let reranker = SemanticReranker::new(Arc::new(HashingEmbedder::new()));
//! let texts = reranker.rerank(&profile, &candidate_texts, 5).await?;
//! ```

pub mod embedding;
pub mod filter_pipeline;
pub mod filters;
pub mod rerank;
pub mod traits;

// Re-export main types
pub use embedding::{
    COSINE_EPSILON, DEFAULT_HASHING_DIMENSION, Embedder, EmbeddingError, EmbeddingResult,
    HashingEmbedder, cosine_similarity, tokenize,
};
pub use filter_pipeline::FilterPipeline;
pub use filters::{DedupFilter, RejectedFilter};
pub use rerank::{SemanticReranker, rank_by_similarity, should_rerank};
pub use traits::Filter;
