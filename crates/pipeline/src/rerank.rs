//! Semantic reranking of a small CF candidate pool against the user's profile.

use crate::embedding::{Embedder, EmbeddingError, EmbeddingResult, cosine_similarity};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Reranking only runs when the profile and every candidate text carry
/// content; otherwise the caller keeps scorer order.
pub fn should_rerank(profile: &str, candidate_texts: &[String]) -> bool {
    !profile.trim().is_empty() && candidate_texts.iter().all(|text| !text.trim().is_empty())
}

/// Indices of `candidates` ordered by descending similarity to `profile`,
/// cut to `top_k`. Sorting is stable, so equal similarities keep input order.
pub fn rank_by_similarity(profile: &[f32], candidates: &[Vec<f32>], top_k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, vector)| (idx, cosine_similarity(profile, vector)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(top_k).map(|(idx, _)| idx).collect()
}

/// Reorders candidate texts by embedding similarity to a profile text.
#[derive(Clone)]
pub struct SemanticReranker {
    embedder: Arc<dyn Embedder>,
}

impl SemanticReranker {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Positions into `candidate_texts`, best match first, at most `top_k`.
    ///
    /// When [`should_rerank`] fails nothing is embedded and the input order
    /// is returned truncated.
    #[instrument(skip_all, fields(candidates = candidate_texts.len(), top_k = top_k))]
    pub async fn rerank_indices(
        &self,
        profile: &str,
        candidate_texts: &[String],
        top_k: usize,
    ) -> EmbeddingResult<Vec<usize>> {
        if !should_rerank(profile, candidate_texts) {
            debug!("Rerank preconditions not met, keeping input order");
            return Ok((0..candidate_texts.len().min(top_k)).collect());
        }

        let start = Instant::now();
        let mut batch = Vec::with_capacity(candidate_texts.len() + 1);
        batch.push(profile.to_string());
        batch.extend_from_slice(candidate_texts);

        let vectors = self.embedder.embed(&batch).await?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                requested: batch.len(),
                returned: vectors.len(),
            });
        }

        let (profile_vector, candidate_vectors) = vectors.split_at(1);
        let expected = profile_vector[0].len();
        if let Some(bad) = candidate_vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                found: bad.len(),
            });
        }

        let ranked = rank_by_similarity(&profile_vector[0], candidate_vectors, top_k);
        debug!(
            embedder = self.embedder.name(),
            elapsed = ?start.elapsed(),
            "Reranked candidates"
        );
        Ok(ranked)
    }

    /// The reordered subsequence of `candidate_texts`, at most `top_k` long
    pub async fn rerank(
        &self,
        profile: &str,
        candidate_texts: &[String],
        top_k: usize,
    ) -> EmbeddingResult<Vec<String>> {
        let order = self.rerank_indices(profile, candidate_texts, top_k).await?;
        Ok(order
            .into_iter()
            .map(|idx| candidate_texts[idx].clone())
            .collect())
    }
}
