//! Hybrid recommendation retrieval library (used by the server and integration tests).
//!
//! A request for a user's recommendations is served from the cache when a fresh entry
//! exists. Otherwise the [`RetrievalOrchestrator`] walks three read-only stores in a
//! fixed order:
//!
//! 1. [`SimilarityIndex`]: the user's embedding, then its nearest users.
//! 2. [`RelationshipStore`]: campaigns those users took part in, with counts.
//! 3. [`MetricsStore`]: engagement per campaign, used to break ties.
//!
//! The ranked list is written back to the cache with a TTL.
//!
//! ## Test/Mock Support
//! Mock implementations of every store are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod graph;
pub mod hashing;
pub mod metrics;
pub mod model;
pub mod retrieval;
pub mod vectordb;

pub use cache::{
    CacheBackend, CacheError, CacheResult, MemoryCache, RecommendationCache, RedisCache,
};
pub use config::{Config, ConfigError, RetrievalConfig};
pub use constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_EMBEDDING_DIM, DEFAULT_SIMILARITY_K, DimConfig,
    DimValidationError, MAX_USER_ID_LEN, SIMILAR_USERS_REASON, validate_embedding_dim,
};
pub use graph::{GraphError, Neo4jStore, RelationshipStore};
pub use hashing::{hash_to_u64, recommendation_cache_key, user_point_id};
pub use metrics::{MetricsError, MetricsStore, SqliteMetricsStore};
pub use model::{CachedResult, CampaignConnection, Recommendation, RetrievalSource, SimilarityMatch};
pub use retrieval::{
    RecommendationOutcome, RetrievalError, RetrievalOrchestrator, StoreFailure, StoreKind,
    StoreReadiness, rank_campaigns, validate_user_id,
};
pub use vectordb::{QdrantIndex, SimilarityIndex, VectorDbError};

#[cfg(any(test, feature = "mock"))]
pub use cache::{MockCache, MockClock};
#[cfg(any(test, feature = "mock"))]
pub use graph::MockRelationshipStore;
#[cfg(any(test, feature = "mock"))]
pub use metrics::MockMetricsStore;
#[cfg(any(test, feature = "mock"))]
pub use retrieval::MockOrchestrator;
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockSimilarityIndex;
