use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::model::{UserPoint, dedup_matches};
use super::{SimilarityIndex, VectorDbError};
use crate::model::SimilarityMatch;

const MOCK_COLLECTION: &str = "mock";

/// In-memory similarity index with exact cosine search.
///
/// Scripted neighbours (see [`MockSimilarityIndex::set_neighbors`]) take precedence
/// over the cosine search so tests can pin exact orderings.
#[derive(Default)]
pub struct MockSimilarityIndex {
    points: RwLock<HashMap<u64, UserPoint>>,
    neighbors: RwLock<HashMap<String, Vec<SimilarityMatch>>>,
    fail: AtomicBool,
    delay: RwLock<Option<Duration>>,
    embedding_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MockSimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) a user's embedding.
    pub fn insert_user(&self, user_id: &str, vector: Vec<f32>) {
        let point = UserPoint::new(user_id, vector);
        self.points.write().insert(point.id, point);
    }

    /// Pins the neighbours returned when searching with `user_id`'s embedding.
    pub fn set_neighbors(&self, user_id: &str, neighbors: Vec<SimilarityMatch>) {
        self.neighbors
            .write()
            .insert(user_id.to_string(), neighbors);
    }

    /// Makes every subsequent call fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Delays every subsequent call.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    pub fn embedding_calls(&self) -> usize {
        self.embedding_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.embedding_calls() + self.search_calls()
    }

    async fn simulate(&self, op: &str) -> Result<(), VectorDbError> {
        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: format!("injected {} failure", op),
            });
        }
        Ok(())
    }

    fn owner_of(&self, query: &[f32]) -> Option<String> {
        self.points
            .read()
            .values()
            .find(|p| p.vector == query)
            .map(|p| p.user_id.clone())
    }
}

impl SimilarityIndex for MockSimilarityIndex {
    async fn is_ready(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }

    async fn user_embedding(&self, user_id: &str) -> Result<Option<Vec<f32>>, VectorDbError> {
        self.embedding_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate("fetch").await?;

        Ok(self
            .points
            .read()
            .values()
            .find(|p| p.user_id == user_id)
            .map(|p| p.vector.clone()))
    }

    async fn top_k(
        &self,
        query: Vec<f32>,
        k: u64,
        exclude_user: Option<&str>,
    ) -> Result<Vec<SimilarityMatch>, VectorDbError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate("search").await?;

        let scripted = self
            .owner_of(&query)
            .and_then(|owner| self.neighbors.read().get(&owner).cloned());

        let mut results: Vec<SimilarityMatch> = match scripted {
            Some(neighbors) => neighbors,
            None => {
                let mut scored: Vec<SimilarityMatch> = self
                    .points
                    .read()
                    .values()
                    .map(|p| SimilarityMatch::new(p.user_id.clone(), cosine_similarity(&query, &p.vector)))
                    .collect();
                scored.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.user_id.cmp(&b.user_id))
                });
                scored
            }
        };

        results.retain(|m| Some(m.user_id.as_str()) != exclude_user);
        let mut results = dedup_matches(results);
        results.truncate(k as usize);
        Ok(results)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
