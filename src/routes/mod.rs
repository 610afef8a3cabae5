pub mod lookup_routes;
pub mod vehicle_routes;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_middleware};
use crate::state::AppState;

/// Las fotos llegan en base64 dentro del JSON
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .merge(lookup_routes::create_lookup_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_middleware(&state.config.cors_origins))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "vehicle-registry",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
