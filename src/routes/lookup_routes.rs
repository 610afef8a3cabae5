use axum::{extract::State, routing::get, Json, Router};

use crate::models::{Brand, DocumentType, Procedure, VehicleType};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Listas de referencia para los selectores del cliente
pub fn create_lookup_router() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands))
        .route("/vehicle-types", get(list_vehicle_types))
        .route("/document-types", get(list_document_types))
        .route("/procedures", get(list_procedures))
}

async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, AppError> {
    Ok(Json(state.lookups.list_brands().await?))
}

async fn list_vehicle_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleType>>, AppError> {
    Ok(Json(state.lookups.list_vehicle_types().await?))
}

async fn list_document_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentType>>, AppError> {
    Ok(Json(state.lookups.list_document_types().await?))
}

async fn list_procedures(
    State(state): State<AppState>,
) -> Result<Json<Vec<Procedure>>, AppError> {
    Ok(Json(state.lookups.list_procedures().await?))
}
