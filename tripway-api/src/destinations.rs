use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Serialize;
use tripway_core::catalog::{Destination, DestinationInput};
use tripway_core::search::DestinationSearch;

use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/destinations", get(list_destinations).post(create_destination))
        .route("/api/destinations/search", get(search_destinations))
        .route(
            "/api/destinations/{id}",
            get(get_destination)
                .put(update_destination)
                .delete(delete_destination),
        )
}

async fn list_destinations(State(state): State<AppState>) -> Result<Json<Vec<Destination>>, AppError> {
    Ok(Json(state.destinations.list_destinations().await?))
}

async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Destination>, AppError> {
    state
        .destinations
        .get_destination(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn create_destination(
    State(state): State<AppState>,
    Json(input): Json<DestinationInput>,
) -> Result<(StatusCode, Json<Destination>), AppError> {
    input.validate()?;
    let created = state.destinations.create_destination(input).await?;
    tracing::info!("Destination {} created", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<DestinationInput>,
) -> Result<Json<Destination>, AppError> {
    input.validate()?;
    state
        .destinations
        .update_destination(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.destinations.delete_destination(id).await? {
        return Err(not_found(id));
    }
    tracing::info!("Destination {} deleted", id);
    Ok(Json(DeleteResponse {
        success: true,
        message: "Destination deleted".to_string(),
    }))
}

/// GET /api/destinations/search
async fn search_destinations(
    State(state): State<AppState>,
    Query(search): Query<DestinationSearch>,
) -> Result<Json<Vec<Destination>>, AppError> {
    let search = search.normalized();
    Ok(Json(state.destinations.search_destinations(&search).await?))
}

fn not_found(id: u64) -> AppError {
    AppError::NotFoundError(format!("Destination {} not found", id))
}
