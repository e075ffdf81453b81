//! Similarity index over user embeddings (Qdrant).

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantIndex, SimilarityIndex};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockSimilarityIndex, cosine_similarity};
pub use model::{USER_ID_FIELD, UserPoint, dedup_matches};
