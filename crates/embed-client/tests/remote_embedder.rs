//! RemoteEmbedder against a mock embedding service on an ephemeral port.

use embed_client::embeddings::embedder_server::{Embedder as EmbedderService, EmbedderServer};
use embed_client::embeddings::{EmbedRequest, EmbedResponse, Embedding};
use embed_client::{EmbedClientError, RemoteEmbedder};
use pipeline::{Embedder, EmbeddingError, SemanticReranker};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// How the mock misbehaves
#[derive(Clone, Copy)]
enum Mode {
    /// Keyword vector: [mentions python, mentions go, 1.0]
    Keywords,
    /// Drops the last embedding
    Short,
    /// Second embedding has an extra component
    Ragged,
    /// Every call fails
    Failing,
}

struct MockEmbedder {
    mode: Mode,
}

fn keyword_vector(sentence: &str) -> Vec<f32> {
    let lower = sentence.to_lowercase();
    vec![
        if lower.contains("python") { 1.0 } else { 0.0 },
        if lower.contains("go ") || lower.ends_with("go") { 1.0 } else { 0.0 },
        0.1,
    ]
}

#[tonic::async_trait]
impl EmbedderService for MockEmbedder {
    async fn embed(&self, request: Request<EmbedRequest>) -> Result<Response<EmbedResponse>, Status> {
        let sentences = request.into_inner().sentences;
        let mut embeddings: Vec<Embedding> = sentences
            .iter()
            .map(|s| Embedding {
                values: keyword_vector(s),
            })
            .collect();

        match self.mode {
            Mode::Keywords => {}
            Mode::Short => {
                embeddings.pop();
            }
            Mode::Ragged => {
                if let Some(second) = embeddings.get_mut(1) {
                    second.values.push(0.0);
                }
            }
            Mode::Failing => return Err(Status::unavailable("model not loaded")),
        }

        Ok(Response::new(EmbedResponse { embeddings }))
    }
}

/// Start a mock embedding service on a random port
async fn start_mock_service(mode: Mode) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock embedding service");
    let addr = listener.local_addr().expect("Failed to get local address");
    let service = EmbedderServer::new(MockEmbedder { mode });

    let handle = tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("Mock embedding service failed");
    });

    (format!("http://{}", addr), handle)
}

fn sentences(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_embeds_one_vector_per_sentence() {
    let (addr, handle) = start_mock_service(Mode::Keywords).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();

    let vectors = embedder
        .embed(&sentences(&["python data pipelines", "a go microservice"]))
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0, 0.1], vec![0.0, 1.0, 0.1]]);
    handle.abort();
}

#[tokio::test]
async fn test_empty_batch_skips_the_call() {
    let (addr, handle) = start_mock_service(Mode::Failing).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();

    assert!(embedder.embed(&[]).await.unwrap().is_empty());
    handle.abort();
}

#[tokio::test]
async fn test_short_response_is_count_mismatch() {
    let (addr, handle) = start_mock_service(Mode::Short).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();

    let result = embedder.embed_sentences(&sentences(&["a", "b", "c"])).await;
    assert!(matches!(
        result,
        Err(EmbedClientError::CountMismatch {
            requested: 3,
            returned: 2
        })
    ));
    handle.abort();
}

#[tokio::test]
async fn test_ragged_response_is_dimension_mismatch() {
    let (addr, handle) = start_mock_service(Mode::Ragged).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();

    let result = embedder.embed(&sentences(&["a", "b"])).await;
    assert!(matches!(
        result,
        Err(EmbeddingError::DimensionMismatch {
            expected: 3,
            found: 4
        })
    ));
    handle.abort();
}

#[tokio::test]
async fn test_expected_dimension_is_enforced() {
    let (addr, handle) = start_mock_service(Mode::Keywords).await;
    let embedder = RemoteEmbedder::connect(addr)
        .await
        .unwrap()
        .with_expected_dimension(384);

    let result = embedder.embed_sentences(&sentences(&["python"])).await;
    assert!(matches!(
        result,
        Err(EmbedClientError::DimensionMismatch {
            expected: 384,
            found: 3
        })
    ));
    handle.abort();
}

#[tokio::test]
async fn test_service_error_is_unavailable() {
    let (addr, handle) = start_mock_service(Mode::Failing).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();

    let result = embedder.embed(&sentences(&["python"])).await;
    assert!(matches!(result, Err(EmbeddingError::Unavailable(_))));
    handle.abort();
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(RemoteEmbedder::connect(format!("http://{}", addr)).await.is_err());
}

#[tokio::test]
async fn test_drives_semantic_reranker() {
    let (addr, handle) = start_mock_service(Mode::Keywords).await;
    let embedder = RemoteEmbedder::connect(addr).await.unwrap();
    let reranker = SemanticReranker::new(Arc::new(embedder));

    let ranked = reranker
        .rerank(
            "python data pipelines",
            &sentences(&["a go microservice", "a Python ETL pipeline"]),
            1,
        )
        .await
        .unwrap();

    assert_eq!(ranked, sentences(&["a Python ETL pipeline"]));
    handle.abort();
}
