//! # Recommendation Orchestrator
//!
//! This module coordinates the entire recommendation flow:
//! 1. Snapshot the serving model
//! 2. Fetch the user's rejected repos from the live store
//! 3. Score the whole repo universe and run the filter pipeline
//! 4. Keep a small pool from the head of the list
//! 5. Rerank the pool against the user's profile text, if possible
//! 6. Return the top N repo ids
//!
//! Store calls run on the blocking pool under a timeout. Failing to fetch
//! rejections aborts the request; every failure after that only costs the
//! semantic rerank and the CF order is served instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use collab::{Candidate, CandidateScorer, CfError, FactorModel, ModelHandle, UserContext};
use data_loader::{InteractionStore, RepoId, StoreError, StoreResult};
use embed_client::RemoteEmbedder;
use pipeline::{Embedder, EmbeddingError, FilterPipeline, SemanticReranker, should_rerank};

/// Errors that fail a recommendation request
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Model(#[from] CfError),

    #[error("interaction store failed during {operation}: {source}")]
    Store {
        operation: &'static str,
        source: StoreError,
    },

    #[error("interaction store timed out during {operation} after {timeout:?}")]
    StoreTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Why the semantic rerank was skipped for a request
#[derive(Error, Debug)]
enum RerankSkipped {
    #[error(transparent)]
    Store(OrchestratorError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("embedding timed out after {0:?}")]
    Timeout(Duration),
}

/// Tuning knobs for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Candidates handed to the reranker; the pool is `max(n, rerank_pool_size)`
    pub rerank_pool_size: usize,
    pub rerank_enabled: bool,
    /// Deadline for each interaction store call
    pub store_timeout: Duration,
    /// Deadline for the whole embedding + rerank step
    pub embed_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            rerank_pool_size: 10,
            rerank_enabled: true,
            store_timeout: Duration::from_secs(2),
            embed_timeout: Duration::from_secs(3),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_rerank_pool_size(mut self, size: usize) -> Self {
        self.rerank_pool_size = size;
        self
    }

    pub fn with_rerank_enabled(mut self, enabled: bool) -> Self {
        self.rerank_enabled = enabled;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }
}

/// Main orchestrator that coordinates the recommendation flow
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    model: Arc<ModelHandle>,
    store: Arc<dyn InteractionStore>,
    scorer: CandidateScorer,
    filter_pipeline: Arc<FilterPipeline>,
    reranker: Option<SemanticReranker>,
    config: OrchestratorConfig,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator. Without an embedder (or with reranking
    /// disabled) results are served in CF order.
    pub fn new(
        model: Arc<ModelHandle>,
        store: Arc<dyn InteractionStore>,
        embedder: Option<Arc<dyn Embedder>>,
        config: OrchestratorConfig,
    ) -> Self {
        let reranker = embedder
            .filter(|_| config.rerank_enabled)
            .map(SemanticReranker::new);

        Self {
            model,
            store,
            scorer: CandidateScorer::new(),
            filter_pipeline: Arc::new(FilterPipeline::standard()),
            reranker,
            config,
        }
    }

    /// Create an orchestrator that reranks through a remote embedding service
    pub async fn with_remote_embedder(
        model: Arc<ModelHandle>,
        store: Arc<dyn InteractionStore>,
        embedder_addr: impl Into<String>,
        config: OrchestratorConfig,
    ) -> anyhow::Result<Self> {
        let embedder = RemoteEmbedder::connect(embedder_addr)
            .await
            .context("Failed to connect to embedding service")?;
        Ok(Self::new(model, store, Some(Arc::new(embedder)), config))
    }

    pub fn model_handle(&self) -> &Arc<ModelHandle> {
        &self.model
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Re-read the model artifact; on failure the current model keeps serving
    pub fn reload_model(&self) -> Result<()> {
        self.model.reload()?;
        info!("Model reloaded");
        Ok(())
    }

    /// Main entry point: up to `n` repo ids for a user, best first
    #[instrument(skip(self))]
    pub async fn recommend(&self, user_id: &str, n: usize) -> Result<Vec<RepoId>> {
        if n == 0 {
            return Err(OrchestratorError::InvalidRequest(
                "n must be at least 1".to_string(),
            ));
        }

        let start_time = Instant::now();
        let model = self.model.current();

        if model.users().get_index(user_id).is_none() {
            info!("User {} is not part of the trained model", user_id);
            return Ok(Vec::new());
        }

        // Rejections are read live, never from the model snapshot
        let rejected = self
            .call_store("get_rejected_items", {
                let user_id = user_id.to_string();
                move |store| store.get_rejected_items(&user_id)
            })
            .await?;
        let context = UserContext::new(user_id).with_rejected(rejected);
        info!(
            "Built user context for user {} ({} rejected repos)",
            user_id,
            context.rejected_repos.len()
        );

        let mut pool = self.score_and_filter(model, context).await?;
        pool.truncate(n.max(self.config.rerank_pool_size));
        info!("Scored and filtered, pool size {}", pool.len());

        let recommendations = match self.rerank_pool(user_id, &pool, n).await {
            Ok(Some(ids)) => ids,
            Ok(None) => take_ids(pool, n),
            Err(reason) => {
                warn!(error = %reason, "Semantic rerank skipped, serving CF order");
                take_ids(pool, n)
            }
        };

        info!(
            "Selected {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// The single best repo for a user, if any
    pub async fn recommend_one(&self, user_id: &str) -> Result<Option<RepoId>> {
        Ok(self.recommend(user_id, 1).await?.into_iter().next())
    }

    /// Run a store call on the blocking pool under the store deadline
    async fn call_store<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn InteractionStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || call(store.as_ref()));

        match tokio::time::timeout(self.config.store_timeout, task).await {
            Err(_) => Err(OrchestratorError::StoreTimeout {
                operation,
                timeout: self.config.store_timeout,
            }),
            Ok(Err(join_error)) => Err(OrchestratorError::Task(join_error.to_string())),
            Ok(Ok(result)) => result.map_err(|source| OrchestratorError::Store { operation, source }),
        }
    }

    /// Full-universe scoring and filtering, off the async runtime
    async fn score_and_filter(
        &self,
        model: Arc<FactorModel>,
        context: UserContext,
    ) -> Result<Vec<Candidate>> {
        let scorer = self.scorer.clone();
        let filter_pipeline = Arc::clone(&self.filter_pipeline);

        let filtered = tokio::task::spawn_blocking(move || {
            let scored = scorer.score(&context.user_id, &model);
            debug!("Scored {} repos", scored.len());
            filter_pipeline.apply(scored, &context)
        })
        .await
        .map_err(|e| OrchestratorError::Task(e.to_string()))?
        .context("Failed to apply filters")?;

        Ok(filtered)
    }

    /// `Ok(None)` when reranking does not apply to this request
    async fn rerank_pool(
        &self,
        user_id: &str,
        pool: &[Candidate],
        n: usize,
    ) -> std::result::Result<Option<Vec<RepoId>>, RerankSkipped> {
        let Some(reranker) = &self.reranker else {
            return Ok(None);
        };
        if pool.is_empty() {
            return Ok(None);
        }

        let (profile, candidate_texts) = self
            .fetch_rerank_texts(user_id, pool)
            .await
            .map_err(RerankSkipped::Store)?;

        if !should_rerank(&profile, &candidate_texts) {
            debug!("Profile or candidate text missing, keeping CF order");
            return Ok(None);
        }

        let ranked = tokio::time::timeout(
            self.config.embed_timeout,
            reranker.rerank(&profile, &candidate_texts, n),
        )
        .await
        .map_err(|_| RerankSkipped::Timeout(self.config.embed_timeout))??;

        debug!(
            "Reranked {} candidates with {}",
            pool.len(),
            reranker.embedder_name()
        );
        Ok(Some(map_texts_to_ids(&ranked, pool, &candidate_texts)))
    }

    /// Profile text plus one text per pool entry (description and feedback reason)
    async fn fetch_rerank_texts(
        &self,
        user_id: &str,
        pool: &[Candidate],
    ) -> Result<(String, Vec<String>)> {
        let user_id = user_id.to_string();
        let repo_ids: Vec<RepoId> = pool.iter().map(|c| c.repo_id.clone()).collect();

        self.call_store("get_rerank_texts", move |store| {
            let profile = store.get_user_text(&user_id)?;
            let descriptions = store.get_item_texts(&repo_ids)?;

            let mut texts = Vec::with_capacity(repo_ids.len());
            for repo_id in &repo_ids {
                let reason = store.get_feedback_reason(&user_id, repo_id)?;
                let description = descriptions.get(repo_id).map_or("", String::as_str);
                texts.push(candidate_text(description, reason.as_deref()));
            }
            Ok((profile, texts))
        })
        .await
    }
}

/// Description and feedback reason, trimmed and joined by one space
pub fn candidate_text(description: &str, feedback_reason: Option<&str>) -> String {
    [Some(description), feedback_reason]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map reranked texts back to pool ids. Identical texts resolve to the
/// first pool entry not yet used, so ids stay unique.
pub fn map_texts_to_ids(ranked: &[String], pool: &[Candidate], texts: &[String]) -> Vec<RepoId> {
    let mut used = vec![false; pool.len()];
    let mut ids = Vec::with_capacity(ranked.len());

    for text in ranked {
        let slot = texts
            .iter()
            .zip(&used)
            .position(|(candidate, taken)| !taken && candidate == text);
        if let Some(idx) = slot {
            used[idx] = true;
            ids.push(pool[idx].repo_id.clone());
        }
    }
    ids
}

fn take_ids(pool: Vec<Candidate>, n: usize) -> Vec<RepoId> {
    pool.into_iter().take(n).map(|c| c.repo_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use collab::{TrainingConfig, train};
    use data_loader::{Interaction, InteractionIndex, Repository, Signal, User};
    use pipeline::{EmbeddingResult, HashingEmbedder};
    use std::collections::{HashMap, HashSet};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn repo(id: &str, description: &str) -> Repository {
        Repository {
            id: id.to_string(),
            name: id.to_string(),
            description: description.to_string(),
            language: None,
            tags: Vec::new(),
        }
    }

    fn user(id: &str, languages: &[&str], tags: &[&str]) -> User {
        User {
            id: id.to_string(),
            username: String::new(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            skills: Vec::new(),
            preference_tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Six repos; u1 likes python data work, u3 has an empty profile
    fn build_test_index() -> InteractionIndex {
        let mut index = InteractionIndex::new();

        index.insert_user(user("u1", &["python"], &["data", "pipelines"]));
        index.insert_user(user("u2", &["go"], &["backend"]));
        index.insert_user(user("u3", &[], &[]));

        index.insert_repo(repo("r1", "a Go microservice"));
        index.insert_repo(repo("r2", "a Python ETL pipeline"));
        index.insert_repo(repo("r3", "a terminal music player"));
        index.insert_repo(repo("r4", "a Rust web framework"));
        index.insert_repo(repo("r5", "a static site generator"));
        index.insert_repo(repo("r6", "a kernel module"));

        for (user_id, repo_id, signal) in [
            ("u1", "r3", Signal::Positive),
            ("u1", "r4", Signal::Negative),
            ("u1", "r6", Signal::Positive),
            ("u2", "r1", Signal::Positive),
            ("u2", "r2", Signal::Positive),
            ("u2", "r4", Signal::Positive),
            ("u2", "r5", Signal::Negative),
            ("u3", "r1", Signal::Positive),
            ("u3", "r5", Signal::Positive),
        ] {
            index.insert_interaction(Interaction::new(user_id, repo_id, signal));
        }
        index
    }

    fn build_model_handle(index: &InteractionIndex) -> Arc<ModelHandle> {
        let model = train(index.interactions(), &TrainingConfig::default())
            .expect("Failed to train test model");
        Arc::new(ModelHandle::from_model(model))
    }

    fn build_orchestrator(
        store: Arc<dyn InteractionStore>,
        model: Arc<ModelHandle>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> RecommendationOrchestrator {
        let config = OrchestratorConfig::default()
            .with_store_timeout(Duration::from_millis(200))
            .with_embed_timeout(Duration::from_millis(200));
        RecommendationOrchestrator::new(model, store, embedder, config)
    }

    fn hashing() -> Option<Arc<dyn Embedder>> {
        Some(Arc::new(HashingEmbedder::new()))
    }

    /// Wraps the index with injectable delays and failures
    #[derive(Default)]
    struct FlakyStore {
        inner: InteractionIndex,
        rejected_delay: Option<Duration>,
        text_delay: Option<Duration>,
        fail_rejected: bool,
        fail_texts: bool,
    }

    impl InteractionStore for FlakyStore {
        fn list_interactions(&self) -> StoreResult<Vec<Interaction>> {
            self.inner.list_interactions()
        }

        fn get_user_text(&self, user_id: &str) -> StoreResult<String> {
            if let Some(delay) = self.text_delay {
                std::thread::sleep(delay);
            }
            if self.fail_texts {
                return Err(StoreError::Unavailable("profile table offline".into()));
            }
            self.inner.get_user_text(user_id)
        }

        fn get_item_texts(&self, repo_ids: &[RepoId]) -> StoreResult<HashMap<RepoId, String>> {
            self.inner.get_item_texts(repo_ids)
        }

        fn get_rejected_items(&self, user_id: &str) -> StoreResult<HashSet<RepoId>> {
            if let Some(delay) = self.rejected_delay {
                std::thread::sleep(delay);
            }
            if self.fail_rejected {
                return Err(StoreError::QueryFailed("connection reset".into()));
            }
            self.inner.get_rejected_items(user_id)
        }

        fn get_feedback_reason(&self, user_id: &str, repo_id: &str) -> StoreResult<Option<String>> {
            self.inner.get_feedback_reason(user_id, repo_id)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "FailingEmbedder"
        }

        async fn embed(&self, _texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::Unavailable("model not loaded".into()))
        }
    }

    struct SlowEmbedder;

    #[async_trait]
    impl Embedder for SlowEmbedder {
        fn name(&self) -> &str {
            "SlowEmbedder"
        }

        async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            HashingEmbedder::new().embed(texts).await
        }
    }

    /// CF order for a user with reranking off
    async fn cf_order(
        index: &InteractionIndex,
        model: &Arc<ModelHandle>,
        user_id: &str,
        n: usize,
    ) -> Vec<RepoId> {
        let store: Arc<dyn InteractionStore> = Arc::new(index.clone());
        build_orchestrator(store, Arc::clone(model), None)
            .recommend(user_id, n)
            .await
            .unwrap()
    }

    // ============================================================================
    // Unit Tests: helpers
    // ============================================================================

    #[test]
    fn test_candidate_text_joins_description_and_reason() {
        assert_eq!(candidate_text(" a cli ", Some(" fast ")), "a cli fast");
        assert_eq!(candidate_text("a cli", None), "a cli");
        assert_eq!(candidate_text("  ", Some("")), "");
    }

    #[test]
    fn test_map_texts_to_ids_resolves_duplicates_to_unused_slots() {
        let pool = vec![
            Candidate::new("r1", 0.9),
            Candidate::new("r2", 0.8),
            Candidate::new("r3", 0.7),
        ];
        let texts: Vec<String> = ["same", "other", "same"].iter().map(|s| s.to_string()).collect();
        let ranked: Vec<String> = ["same", "same", "other"].iter().map(|s| s.to_string()).collect();

        assert_eq!(map_texts_to_ids(&ranked, &pool, &texts), vec!["r1", "r3", "r2"]);
    }

    // ============================================================================
    // Integration Tests: recommend
    // ============================================================================

    #[tokio::test]
    async fn test_rejected_repo_never_returned() {
        let mut index = InteractionIndex::new();
        index.insert_repo(repo("r1", "a cli"));
        index.insert_repo(repo("r2", "a parser"));
        index.insert_interaction(Interaction::new("u1", "r1", Signal::Positive));
        index.insert_interaction(Interaction::new("u1", "r2", Signal::Negative));
        let model = build_model_handle(&index);
        let orchestrator = build_orchestrator(Arc::new(index), model, hashing());

        let recommendations = orchestrator.recommend("u1", 5).await.unwrap();

        assert_eq!(recommendations, vec!["r1".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_user_gets_empty_list() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let orchestrator = build_orchestrator(Arc::new(index), model, hashing());

        assert!(orchestrator.recommend("ghost", 5).await.unwrap().is_empty());
        assert_eq!(orchestrator.recommend_one("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_n_is_invalid() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let orchestrator = build_orchestrator(Arc::new(index), model, None);

        assert!(matches!(
            orchestrator.recommend("u1", 0).await,
            Err(OrchestratorError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_output_unique_bounded_and_from_universe() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let universe: HashSet<String> = model.current().items().ids().iter().cloned().collect();
        let orchestrator = build_orchestrator(Arc::new(index), model, hashing());

        for user_id in ["u1", "u2", "u3"] {
            for n in 1..=7 {
                let recommendations = orchestrator.recommend(user_id, n).await.unwrap();
                let unique: HashSet<&String> = recommendations.iter().collect();

                assert!(recommendations.len() <= n);
                assert_eq!(unique.len(), recommendations.len());
                assert!(recommendations.iter().all(|id| universe.contains(id)));
            }
        }

        let for_u1 = orchestrator.recommend("u1", 10).await.unwrap();
        assert!(!for_u1.contains(&"r4".to_string()));
        assert_eq!(for_u1.len(), 5);
    }

    #[tokio::test]
    async fn test_rerank_promotes_profile_match() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let orchestrator = build_orchestrator(Arc::new(index), model, hashing());

        let top = orchestrator.recommend_one("u1").await.unwrap();

        assert_eq!(top, Some("r2".to_string()));
    }

    #[tokio::test]
    async fn test_empty_profile_keeps_cf_order() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u3", 4).await;
        let orchestrator = build_orchestrator(Arc::new(index), model, hashing());

        assert_eq!(orchestrator.recommend("u3", 4).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failing_embedder_falls_back_to_cf_order() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u1", 3).await;
        let embedder: Arc<dyn Embedder> = Arc::new(FailingEmbedder);
        let orchestrator = build_orchestrator(Arc::new(index), model, Some(embedder));

        assert_eq!(orchestrator.recommend("u1", 3).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_slow_embedder_falls_back_to_cf_order() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u1", 3).await;
        let embedder: Arc<dyn Embedder> = Arc::new(SlowEmbedder);
        let orchestrator = build_orchestrator(Arc::new(index), model, Some(embedder));

        assert_eq!(orchestrator.recommend("u1", 3).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_slow_text_fetch_falls_back_to_cf_order() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u1", 3).await;
        let store = FlakyStore {
            inner: index,
            text_delay: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let orchestrator = build_orchestrator(Arc::new(store), model, hashing());

        assert_eq!(orchestrator.recommend("u1", 3).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failed_text_fetch_falls_back_to_cf_order() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u1", 3).await;
        let store = FlakyStore {
            inner: index,
            fail_texts: true,
            ..Default::default()
        };
        let orchestrator = build_orchestrator(Arc::new(store), model, hashing());

        assert_eq!(orchestrator.recommend("u1", 3).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_rejected_fetch_failure_fails_request() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let store = FlakyStore {
            inner: index,
            fail_rejected: true,
            ..Default::default()
        };
        let orchestrator = build_orchestrator(Arc::new(store), model, hashing());

        assert!(matches!(
            orchestrator.recommend("u1", 3).await,
            Err(OrchestratorError::Store {
                operation: "get_rejected_items",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_slow_rejected_fetch_times_out() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let store = FlakyStore {
            inner: index,
            rejected_delay: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let orchestrator = build_orchestrator(Arc::new(store), model, hashing());

        assert!(matches!(
            orchestrator.recommend("u1", 3).await,
            Err(OrchestratorError::StoreTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_rerank_disabled_by_config() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let expected = cf_order(&index, &model, "u1", 2).await;
        let config = OrchestratorConfig::default().with_rerank_enabled(false);
        let orchestrator = RecommendationOrchestrator::new(model, Arc::new(index), hashing(), config);

        assert_eq!(orchestrator.recommend("u1", 2).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_serving() {
        let index = build_test_index();
        let model = build_model_handle(&index);
        let orchestrator = build_orchestrator(Arc::new(index), Arc::clone(&model), None);

        assert!(matches!(
            orchestrator.reload_model(),
            Err(OrchestratorError::Model(CfError::ModelUnavailable { .. }))
        ));
        assert!(!orchestrator.recommend("u1", 3).await.unwrap().is_empty());
    }
}
