use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = state.vehicles.list().await?;
    let public_url = &state.config.blob_public_url;

    Ok(Json(
        vehicles
            .into_iter()
            .map(|details| VehicleResponse::from_details(details, public_url))
            .collect(),
    ))
}

async fn get_vehicle(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<VehicleResponse>, AppError> {
    let Path(id) = id?;
    let details = state.vehicles.get(id).await?;
    Ok(Json(VehicleResponse::from_details(
        details,
        &state.config.blob_public_url,
    )))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateVehicleRequest>, JsonRejection>,
) -> Result<Json<VehicleResponse>, AppError> {
    let Json(request) = payload?;
    tracing::debug!("Creación de vehículo solicitada por {}", user.user_id);
    let details = state.vehicles.create(request).await?;
    Ok(Json(VehicleResponse::from_details(
        details,
        &state.config.blob_public_url,
    )))
}

async fn update_vehicle(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateVehicleRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    state.vehicles.update(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_vehicle(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.vehicles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
