//! gRPC client for a remote sentence-embedding service.
//!
//! This crate provides [`RemoteEmbedder`], which implements the pipeline's
//! [`Embedder`] trait by calling `embeddings.Embedder/Embed`. It handles:
//! - Connection management to the embedding service
//! - Per-request deadlines
//! - Validating that the response carries one vector per sentence, all of
//!   one dimension

use anyhow::{Context, Result};
use async_trait::async_trait;
use pipeline::{Embedder, EmbeddingError, EmbeddingResult};
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, error, info};

// Include the generated protobuf code
pub mod embeddings {
    tonic::include_proto!("embeddings");
}

use embeddings::{embedder_client::EmbedderClient, EmbedRequest};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when talking to the embedding service
#[derive(Error, Debug)]
pub enum EmbedClientError {
    #[error("embedding request failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("service returned {returned} embeddings for {requested} sentences")]
    CountMismatch { requested: usize, returned: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid response from embedding service: {0}")]
    InvalidResponse(String),
}

impl From<EmbedClientError> for EmbeddingError {
    fn from(err: EmbedClientError) -> Self {
        match err {
            EmbedClientError::CountMismatch {
                requested,
                returned,
            } => EmbeddingError::CountMismatch {
                requested,
                returned,
            },
            EmbedClientError::DimensionMismatch { expected, found } => {
                EmbeddingError::DimensionMismatch { expected, found }
            }
            other => EmbeddingError::Unavailable(other.to_string()),
        }
    }
}

/// Client for the embedding service.
///
/// Wraps the generated gRPC client; the underlying channel is cheap to clone,
/// so one `RemoteEmbedder` can serve concurrent requests.
#[derive(Clone)]
pub struct RemoteEmbedder {
    client: EmbedderClient<Channel>,
    service_addr: String,
    expected_dimension: Option<usize>,
}

impl RemoteEmbedder {
    /// Connect to the embedding service (e.g. `"http://localhost:50051"`)
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        Self::connect_with_timeouts(addr, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT).await
    }

    pub async fn connect_with_timeouts(
        addr: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let addr = addr.into();
        info!("Connecting to embedding service at {}", addr);

        let channel = Endpoint::from_shared(addr.clone())
            .context("Creating channel from address")?
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .connect()
            .await
            .with_context(|| format!("Connecting to embedding service at {addr}"))?;

        Ok(Self {
            client: EmbedderClient::new(channel),
            service_addr: addr,
            expected_dimension: None,
        })
    }

    /// Reject responses whose vectors are not exactly `dimension` long
    pub fn with_expected_dimension(mut self, dimension: usize) -> Self {
        self.expected_dimension = Some(dimension);
        self
    }

    /// Get the address of the embedding service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }

    /// Embed a batch of sentences, one vector per sentence in request order
    pub async fn embed_sentences(
        &self,
        sentences: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, EmbedClientError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let requested = sentences.len();
        debug!("Embedding {} sentences", requested);

        let request = tonic::Request::new(EmbedRequest {
            sentences: sentences.to_vec(),
        });
        let mut client = self.client.clone();
        let response = client.embed(request).await.map_err(|status| {
            error!("gRPC error while embedding: {}", status);
            EmbedClientError::Rpc(status)
        })?;

        let vectors: Vec<Vec<f32>> = response
            .into_inner()
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect();

        self.validate(requested, &vectors)?;
        Ok(vectors)
    }

    fn validate(
        &self,
        requested: usize,
        vectors: &[Vec<f32>],
    ) -> std::result::Result<(), EmbedClientError> {
        if vectors.len() != requested {
            error!(
                "Mismatch in number of embeddings returned: expected {}, got {}",
                requested,
                vectors.len()
            );
            return Err(EmbedClientError::CountMismatch {
                requested,
                returned: vectors.len(),
            });
        }

        let expected = self
            .expected_dimension
            .unwrap_or_else(|| vectors.first().map_or(0, Vec::len));
        if expected == 0 {
            return Err(EmbedClientError::InvalidResponse(
                "embeddings are empty".into(),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbedClientError::DimensionMismatch {
                expected,
                found: bad.len(),
            });
        }
        if vectors.iter().flatten().any(|v| !v.is_finite()) {
            return Err(EmbedClientError::InvalidResponse(
                "embedding contains non-finite values".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn name(&self) -> &str {
        "RemoteEmbedder"
    }

    async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(self.embed_sentences(texts).await?)
    }
}
