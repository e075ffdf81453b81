use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{RetrievedPoint, ScoredPoint};

use crate::hashing::user_point_id;
use crate::model::SimilarityMatch;

/// Payload key holding the owning user id.
pub const USER_ID_FIELD: &str = "user_id";

/// A user's embedding as stored in the index.
#[derive(Debug, Clone)]
pub struct UserPoint {
    pub id: u64,
    pub user_id: String,
    pub vector: Vec<f32>,
}

impl UserPoint {
    /// Builds a point whose id is derived from `user_id`.
    pub fn new(user_id: impl Into<String>, vector: Vec<f32>) -> Self {
        let user_id = user_id.into();
        Self {
            id: user_point_id(&user_id),
            user_id,
            vector,
        }
    }
}

/// Reads the `user_id` payload of a search hit. Hits without one are dropped.
pub fn match_from_scored_point(point: ScoredPoint) -> Option<SimilarityMatch> {
    let user_id = point
        .payload
        .get(USER_ID_FIELD)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())?;

    Some(SimilarityMatch::new(user_id, point.score))
}

/// Returns the dense vector of a retrieved point when its payload belongs to `user_id`.
///
/// Point ids are hashes, so the payload check guards against the (unlikely) case of
/// two users sharing an id.
#[allow(deprecated)]
pub fn vector_from_retrieved(point: RetrievedPoint, user_id: &str) -> Option<Vec<f32>> {
    match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(_)) => {}
        _ => return None,
    }

    let owner = point
        .payload
        .get(USER_ID_FIELD)
        .and_then(|v| v.as_str())
        .map(|s| s.as_str());
    if owner != Some(user_id) {
        return None;
    }

    match point.vectors?.vectors_options? {
        VectorsOptions::Vector(v) => Some(v.data),
        _ => None,
    }
}

/// Collapses repeated users, keeping the closest occurrence.
pub fn dedup_matches(matches: Vec<SimilarityMatch>) -> Vec<SimilarityMatch> {
    let mut seen = std::collections::HashSet::with_capacity(matches.len());
    matches
        .into_iter()
        .filter(|m| seen.insert(m.user_id.clone()))
        .collect()
}
