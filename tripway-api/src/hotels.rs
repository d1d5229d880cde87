use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use tripway_core::catalog::{Hotel, NewHotel};
use tripway_core::search::HotelSearch;

use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/hotels", get(list_hotels).post(create_hotel))
        .route("/api/hotels/search", get(search_hotels))
        .route("/api/hotels/{id}", get(get_hotel))
}

async fn list_hotels(State(state): State<AppState>) -> Result<Json<Vec<Hotel>>, AppError> {
    Ok(Json(state.hotels.list_hotels().await?))
}

async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Hotel>, AppError> {
    state
        .hotels
        .get_hotel(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Hotel {} not found", id)))
}

async fn create_hotel(
    State(state): State<AppState>,
    Json(hotel): Json<NewHotel>,
) -> Result<(StatusCode, Json<Hotel>), AppError> {
    hotel.validate()?;
    let created = state.hotels.create_hotel(hotel).await?;
    tracing::info!("Hotel {} created", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/hotels/search
async fn search_hotels(
    State(state): State<AppState>,
    Query(search): Query<HotelSearch>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    let search = search.normalized();
    tracing::debug!(?search, "hotel search");
    Ok(Json(state.hotels.search_hotels(&search).await?))
}
