//! Text embedders used by the semantic reranker.
//!
//! [`Embedder`] is the seam: the reranker only needs "texts in, one vector
//! per text out". [`HashingEmbedder`] runs in-process with no model files;
//! a remote sentence-embedding service plugs in through the same trait.

use async_trait::async_trait;
use rayon::prelude::*;
use thiserror::Error;

/// Default dimension of hashed bag-of-words vectors
pub const DEFAULT_HASHING_DIMENSION: usize = 256;

/// Guards the cosine denominator against zero vectors
pub const COSINE_EPSILON: f32 = 1e-8;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "for", "to", "in", "on", "with", "is", "it", "by", "at",
    "as", "from", "this", "that",
];

#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Backend could not be reached or refused the request
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("embedder returned {returned} vectors for {requested} texts")]
    CountMismatch { requested: usize, returned: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;

/// Turns a batch of texts into vectors, one per text and in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the name of this embedder (for logging)
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;
}

/// Deterministic feature-hashed bag of words.
///
/// Tokens are lowercased alphanumeric runs with stop words dropped and a
/// trailing plural `s` stripped. Each token adds ±1 to the bucket picked by
/// its FNV-1a hash; the hash's top bit picks the sign.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_HASHING_DIMENSION,
        }
    }

    /// Zero is bumped to one
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension.max(1);
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// One vector per text, in input order
    pub fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.par_iter().map(|text| self.embed_text(text)).collect()
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "HashingEmbedder"
    }

    /// Hashing is CPU work, so the batch runs on the blocking pool
    async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let embedder = self.clone();
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("hashing task failed: {e}")))
    }
}

/// Lowercased alphanumeric tokens with stop words and plural `s` removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .map(|mut word| {
            if word.chars().count() > 3 && word.ends_with('s') && !word.ends_with("ss") {
                word.pop();
            }
            word
        })
        .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Cosine similarity of two equal-length vectors; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b + COSINE_EPSILON)
}
