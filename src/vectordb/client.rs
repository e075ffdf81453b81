use qdrant_client::Qdrant;
use qdrant_client::qdrant::{Condition, Filter, GetPointsBuilder, PointId, SearchPointsBuilder};
use tracing::{debug, instrument};

use super::error::VectorDbError;
use super::model::{USER_ID_FIELD, dedup_matches, match_from_scored_point, vector_from_retrieved};
use crate::constants::DimConfig;
use crate::hashing::user_point_id;
use crate::model::SimilarityMatch;

/// Read-side interface to the user embedding index.
pub trait SimilarityIndex: Send + Sync {
    /// Returns `true` if the index is reachable.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Fetches the stored embedding for `user_id`, or `None` if the user has none.
    fn user_embedding(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<f32>>, VectorDbError>> + Send;

    /// Returns up to `k` nearest users, closest first, never including `exclude_user`.
    fn top_k(
        &self,
        query: Vec<f32>,
        k: u64,
        exclude_user: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<SimilarityMatch>, VectorDbError>> + Send;
}

#[derive(Clone)]
/// Qdrant-backed similarity index over one vector per user.
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
    collection: String,
    dims: DimConfig,
}

impl QdrantIndex {
    /// Creates a client for `url` reading from `collection`.
    pub fn new(url: &str, collection: &str, dims: DimConfig) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            dims,
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    fn check_dimension(&self, actual: usize) -> Result<(), VectorDbError> {
        self.dims
            .check(actual)
            .map_err(|_| VectorDbError::InvalidDimension {
                expected: self.dims.embedding_dim,
                actual,
            })
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn fetch_user_embedding(&self, user_id: &str) -> Result<Option<Vec<f32>>, VectorDbError> {
        let ids: Vec<PointId> = vec![user_point_id(user_id).into()];

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, ids)
                    .with_vectors(true)
                    .with_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::FetchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let vector = response
            .result
            .into_iter()
            .find_map(|point| vector_from_retrieved(point, user_id));

        if let Some(ref v) = vector {
            self.check_dimension(v.len())?;
        }

        debug!(found = vector.is_some(), "Fetched user embedding");
        Ok(vector)
    }

    #[instrument(skip(self, query), fields(collection = %self.collection, k = k))]
    async fn search_users(
        &self,
        query: Vec<f32>,
        k: u64,
        exclude_user: Option<&str>,
    ) -> Result<Vec<SimilarityMatch>, VectorDbError> {
        self.check_dimension(query.len())?;

        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, query, k).with_payload(true);

        if let Some(user_id) = exclude_user {
            let filter = Filter::must_not([Condition::matches(USER_ID_FIELD, user_id.to_string())]);
            search_builder = search_builder.filter(filter);
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let matches = search_result
            .result
            .into_iter()
            .filter_map(match_from_scored_point)
            .filter(|m| Some(m.user_id.as_str()) != exclude_user)
            .collect();

        Ok(dedup_matches(matches))
    }
}

impl SimilarityIndex for QdrantIndex {
    async fn is_ready(&self) -> bool {
        matches!(self.collection_exists().await, Ok(true))
    }

    async fn user_embedding(&self, user_id: &str) -> Result<Option<Vec<f32>>, VectorDbError> {
        self.fetch_user_embedding(user_id).await
    }

    async fn top_k(
        &self,
        query: Vec<f32>,
        k: u64,
        exclude_user: Option<&str>,
    ) -> Result<Vec<SimilarityMatch>, VectorDbError> {
        self.search_users(query, k, exclude_user).await
    }
}
