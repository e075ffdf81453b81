use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::error::{RetrievalError, StoreFailure, StoreKind};
use super::ranking::rank_campaigns;
use super::single_flight::SingleFlight;
use super::validate::validate_user_id;
use crate::cache::RecommendationCache;
use crate::config::RetrievalConfig;
use crate::graph::RelationshipStore;
use crate::hashing::recommendation_cache_key;
use crate::metrics::MetricsStore;
use crate::model::{CachedResult, Recommendation, RetrievalSource};
use crate::vectordb::{SimilarityIndex, dedup_matches};

#[cfg(any(test, feature = "mock"))]
use crate::cache::MockCache;
#[cfg(any(test, feature = "mock"))]
use crate::graph::MockRelationshipStore;
#[cfg(any(test, feature = "mock"))]
use crate::metrics::MockMetricsStore;
#[cfg(any(test, feature = "mock"))]
use crate::vectordb::MockSimilarityIndex;

/// Ranked list for one user plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationOutcome {
    pub user_id: String,
    pub recommendations: Vec<Recommendation>,
    pub retrieval_source: RetrievalSource,
}

impl RecommendationOutcome {
    fn from_cache(cached: CachedResult) -> Self {
        Self {
            user_id: cached.user_id,
            recommendations: cached.recommendations,
            retrieval_source: RetrievalSource::Cache,
        }
    }

    fn computed(user_id: &str, recommendations: Vec<Recommendation>) -> Self {
        Self {
            user_id: user_id.to_string(),
            recommendations,
            retrieval_source: RetrievalSource::Computed,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        self.retrieval_source == RetrievalSource::Cache
    }
}

/// Reachability of each backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreReadiness {
    pub similarity_index: bool,
    pub relationship_store: bool,
    pub metrics_store: bool,
    pub cache: bool,
}

impl StoreReadiness {
    pub fn all_ready(&self) -> bool {
        self.similarity_index && self.relationship_store && self.metrics_store && self.cache
    }
}

/// Cache-first retrieval over the similarity index, relationship store and metrics store.
pub struct RetrievalOrchestrator<V, G, M, C>
where
    V: SimilarityIndex,
    G: RelationshipStore,
    M: MetricsStore,
    C: RecommendationCache,
{
    index: V,
    graph: G,
    metrics: M,
    cache: C,
    config: RetrievalConfig,
    flights: SingleFlight,
}

impl<V, G, M, C> std::fmt::Debug for RetrievalOrchestrator<V, G, M, C>
where
    V: SimilarityIndex,
    G: RelationshipStore,
    M: MetricsStore,
    C: RecommendationCache,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalOrchestrator")
            .field("config", &self.config)
            .field("in_flight", &self.flights.in_flight())
            .finish_non_exhaustive()
    }
}

impl<V, G, M, C> RetrievalOrchestrator<V, G, M, C>
where
    V: SimilarityIndex,
    G: RelationshipStore,
    M: MetricsStore,
    C: RecommendationCache,
{
    pub fn new(index: V, graph: G, metrics: M, cache: C, config: RetrievalConfig) -> Self {
        Self {
            index,
            graph,
            metrics,
            cache,
            config,
            flights: SingleFlight::new(),
        }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Keys with a computation in progress or queued.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }

    pub async fn readiness(&self) -> StoreReadiness {
        let (similarity_index, relationship_store, metrics_store, cache) = tokio::join!(
            self.index.is_ready(),
            self.graph.is_ready(),
            self.metrics.is_ready(),
            self.cache.is_ready(),
        );
        StoreReadiness {
            similarity_index,
            relationship_store,
            metrics_store,
            cache,
        }
    }

    /// Returns the ranked campaigns for `user_id`, served from cache when fresh.
    ///
    /// Invalid identifiers are rejected before any store is contacted. A failing or
    /// slow store aborts the request and nothing is cached; a failing cache write is
    /// logged and the computed list is still returned.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_recommendations(
        &self,
        user_id: &str,
    ) -> Result<RecommendationOutcome, RetrievalError> {
        validate_user_id(user_id)?;
        let key = recommendation_cache_key(user_id);

        if let Some(hit) = self.read_cache(&key).await {
            info!("Cache hit");
            return Ok(RecommendationOutcome::from_cache(hit));
        }

        if !self.config.single_flight {
            return self.compute_and_store(user_id, &key).await;
        }

        let _flight = self.flights.acquire(&key).await;
        if let Some(hit) = self.read_cache(&key).await {
            info!("Cache filled by concurrent request");
            return Ok(RecommendationOutcome::from_cache(hit));
        }
        self.compute_and_store(user_id, &key).await
    }

    async fn read_cache(&self, key: &str) -> Option<CachedResult> {
        match tokio::time::timeout(self.config.store_timeout, self.cache.get(key)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(key = %key, "Cache read timed out, treating as miss");
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, value: &CachedResult) {
        let write = self.cache.set(key, value, self.config.cache_ttl);
        match tokio::time::timeout(self.config.store_timeout, write).await {
            Ok(Ok(())) => debug!(key = %key, "Cached recommendations"),
            Ok(Err(e)) => warn!(key = %key, error = %e, "Cache write failed"),
            Err(_) => warn!(key = %key, "Cache write timed out"),
        }
    }

    async fn compute_and_store(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<RecommendationOutcome, RetrievalError> {
        let started = Instant::now();
        debug!("Cache miss, computing recommendations");

        let recommendations = self.compute(user_id).await?;

        let cached = CachedResult::computed(user_id, recommendations);
        self.write_cache(key, &cached).await;

        info!(
            recommendations = cached.recommendations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed recommendations"
        );
        Ok(RecommendationOutcome::computed(
            user_id,
            cached.recommendations,
        ))
    }

    async fn compute(&self, user_id: &str) -> Result<Vec<Recommendation>, RetrievalError> {
        let embedding = self
            .bounded(StoreKind::SimilarityIndex, self.index.user_embedding(user_id))
            .await?
            .ok_or_else(|| RetrievalError::UserNotFound {
                user_id: user_id.to_string(),
            })?;

        let matches = self
            .bounded(
                StoreKind::SimilarityIndex,
                self.index
                    .top_k(embedding, self.config.similarity_k, Some(user_id)),
            )
            .await?;

        let similar_users: Vec<String> = dedup_matches(matches)
            .into_iter()
            .filter(|m| m.user_id != user_id)
            .map(|m| m.user_id)
            .collect();

        if similar_users.is_empty() {
            info!("No similar users found");
            return Ok(Vec::new());
        }
        debug!(similar_users = ?similar_users, "Found similar users");

        let connections = self
            .bounded(
                StoreKind::RelationshipStore,
                self.graph.campaigns_for(&similar_users),
            )
            .await?;

        if connections.is_empty() {
            info!("Similar users have no campaigns");
            return Ok(Vec::new());
        }
        debug!(campaigns = connections.len(), "Found candidate campaigns");

        let campaign_ids: Vec<String> = connections
            .iter()
            .map(|c| c.campaign_id.clone())
            .collect();
        let engagement = self
            .bounded(StoreKind::MetricsStore, self.metrics.scores_for(&campaign_ids))
            .await?;

        Ok(rank_campaigns(&connections, &engagement))
    }

    /// Runs one store call under the store timeout.
    async fn bounded<T, E>(
        &self,
        store: StoreKind,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, RetrievalError>
    where
        E: Into<StoreFailure>,
    {
        let limit: Duration = self.config.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let source = e.into();
                warn!(store = %store, error = %source, "Store call failed");
                Err(RetrievalError::StoreUnavailable { store, source })
            }
            Err(_) => {
                warn!(store = %store, timeout_ms = limit.as_millis() as u64, "Store call timed out");
                Err(RetrievalError::StoreUnavailable {
                    store,
                    source: StoreFailure::Timeout(limit),
                })
            }
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub type MockOrchestrator =
    RetrievalOrchestrator<MockSimilarityIndex, MockRelationshipStore, MockMetricsStore, MockCache>;

#[cfg(any(test, feature = "mock"))]
impl MockOrchestrator {
    /// Orchestrator over empty in-memory stores.
    pub fn new_mock(config: RetrievalConfig) -> Self {
        Self::new(
            MockSimilarityIndex::new(),
            MockRelationshipStore::new(),
            MockMetricsStore::new(),
            MockCache::new(),
            config,
        )
    }
}
