//! Reference simulation services
//!
//! Each service answers one POST per tick: it reads the state pushed by the
//! orchestrator, advances its own part of the simulation and replies with the
//! keys it owns.

pub mod grid;
pub mod player;
pub mod visualise;
pub mod world;

pub use grid::WorldGrid;
pub use player::PlayerService;
pub use visualise::VisualiseService;
pub use world::WorldService;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::Value;

/// A service reachable on one update path
pub trait Service: Send + Sync + 'static {
    /// Human readable name, shown on the 404 page
    fn title(&self) -> &'static str;

    /// Path the orchestrator POSTs to
    fn update_path(&self) -> &'static str;

    /// Handle one request body and produce the reply body
    fn receive(&self, request: Value) -> Result<Value, ServiceError>;
}

/// Errors raised while handling a request
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request body: {0}")]
    InvalidRequest(serde_json::Error),

    #[error("Failed to encode reply: {0}")]
    Encode(serde_json::Error),
}

/// RNG for a service, seeded when reproducible runs are wanted
pub fn service_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn encode_reply<T: Serialize>(reply: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(reply).map_err(ServiceError::Encode)
}
