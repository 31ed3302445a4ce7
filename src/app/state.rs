//! Application state shared across service routes

use std::sync::Arc;

use crate::config::{ServiceConfig, ServiceKind};
use crate::sim::{service_rng, PlayerService, Service, VisualiseService, WorldService};

/// Shared state of a running service
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub service: Arc<dyn Service>,
}

impl AppState {
    pub fn new(kind: ServiceKind, config: ServiceConfig) -> Self {
        let rng = service_rng(config.seed);

        let service: Arc<dyn Service> = match kind {
            ServiceKind::World => Arc::new(WorldService::new(rng)),
            ServiceKind::Visualise => Arc::new(VisualiseService::new()),
            ServiceKind::Player => Arc::new(PlayerService::new(
                config.name.clone(),
                config.team.clone(),
                rng,
            )),
        };

        Self {
            config: Arc::new(config),
            service,
        }
    }
}
