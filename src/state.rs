//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Los gateways se construyen una sola vez
//! en el arranque y se inyectan explícitamente.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{IdentityGateway, LookupStore, VehicleStore};
use crate::services::VehicleService;
use crate::storage::BlobStore;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: Arc<JwtConfig>,
    pub vehicles: VehicleService,
    pub lookups: Arc<dyn LookupStore>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        vehicle_store: Arc<dyn VehicleStore>,
        lookups: Arc<dyn LookupStore>,
        identity: Arc<dyn IdentityGateway>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let jwt = JwtConfig::from(&config);
        let vehicles = VehicleService::new(vehicle_store, lookups.clone(), identity, blobs);

        Self {
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            vehicles,
            lookups,
        }
    }
}
