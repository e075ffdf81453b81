//! Relationship store: which campaigns the similar users took part in (Neo4j).

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{Neo4jStore, RelationshipStore};
pub use error::GraphError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRelationshipStore;
