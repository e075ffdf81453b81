use std::sync::Arc;

use recs::cache::RecommendationCache;
use recs::graph::RelationshipStore;
use recs::metrics::MetricsStore;
use recs::retrieval::RetrievalOrchestrator;
use recs::vectordb::SimilarityIndex;

pub struct HandlerState<V, G, M, C>
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    pub orchestrator: Arc<RetrievalOrchestrator<V, G, M, C>>,
}

impl<V, G, M, C> HandlerState<V, G, M, C>
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    pub fn new(orchestrator: Arc<RetrievalOrchestrator<V, G, M, C>>) -> Self {
        Self { orchestrator }
    }
}

impl<V, G, M, C> Clone for HandlerState<V, G, M, C>
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}
