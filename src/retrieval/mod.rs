//! Retrieval core: cache-first lookup, store sequencing and ranking.

pub mod error;
pub mod orchestrator;
pub mod ranking;
pub mod single_flight;
pub mod validate;


pub use error::{RetrievalError, StoreFailure, StoreKind};
#[cfg(any(test, feature = "mock"))]
pub use orchestrator::MockOrchestrator;
pub use orchestrator::{RecommendationOutcome, RetrievalOrchestrator, StoreReadiness};
pub use ranking::rank_campaigns;
pub use single_flight::{FlightGuard, SingleFlight};
pub use validate::validate_user_id;
