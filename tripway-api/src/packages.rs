use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;
use tripway_core::catalog::{
    Accommodation, Faq, ItineraryDay, NewPackage, Package, PackageDetails, PackageImage,
    PackageItem,
};
use tripway_core::CoreResult;

use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PackageFilter {
    destination_id: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/packages", get(list_packages).post(create_package))
        .route("/api/packages/{id}", get(get_package))
        .route("/api/packages/{id}/details", get(package_details))
        .route("/api/packages/{id}/images", get(package_images))
        .route("/api/packages/{id}/inclusions", get(package_inclusions))
        .route("/api/packages/{id}/exclusions", get(package_exclusions))
        .route("/api/packages/{id}/itinerary", get(package_itinerary))
        .route("/api/packages/{id}/accommodations", get(package_accommodations))
        .route("/api/packages/{id}/faqs", get(package_faqs))
}

async fn list_packages(
    State(state): State<AppState>,
    Query(filter): Query<PackageFilter>,
) -> Result<Json<Vec<Package>>, AppError> {
    Ok(Json(state.packages.list_packages(filter.destination_id).await?))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Package>, AppError> {
    state
        .packages
        .get_package(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Package {} not found", id)))
}

/// POST /api/packages
/// Creates the package together with any child collections in the body.
async fn create_package(
    State(state): State<AppState>,
    Json(package): Json<NewPackage>,
) -> Result<(StatusCode, Json<Package>), AppError> {
    package.validate()?;
    let created = state.packages.create_package(package).await?;
    tracing::info!("Package {} created", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn package_images(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<PackageImage>>, AppError> {
    Ok(Json(state.packages.package_images(id).await?))
}

async fn package_inclusions(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<PackageItem>>, AppError> {
    Ok(Json(state.packages.package_inclusions(id).await?))
}

async fn package_exclusions(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<PackageItem>>, AppError> {
    Ok(Json(state.packages.package_exclusions(id).await?))
}

async fn package_itinerary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<ItineraryDay>>, AppError> {
    Ok(Json(state.packages.package_itinerary(id).await?))
}

async fn package_accommodations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Accommodation>>, AppError> {
    Ok(Json(state.packages.package_accommodations(id).await?))
}

async fn package_faqs(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Faq>>, AppError> {
    Ok(Json(state.packages.package_faqs(id).await?))
}

/// GET /api/packages/{id}/details
///
/// The package itself must load; each child collection is fetched concurrently
/// and a failing one is reported as empty.
async fn package_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PackageDetails>, AppError> {
    let repo = &state.packages;
    let (package, images, inclusions, exclusions, itinerary, accommodations, faqs) = tokio::join!(
        repo.get_package(id),
        repo.package_images(id),
        repo.package_inclusions(id),
        repo.package_exclusions(id),
        repo.package_itinerary(id),
        repo.package_accommodations(id),
        repo.package_faqs(id),
    );

    let package = package?
        .ok_or_else(|| AppError::NotFoundError(format!("Package {} not found", id)))?;

    Ok(Json(PackageDetails {
        package,
        images: or_empty("images", id, images),
        inclusions: or_empty("inclusions", id, inclusions),
        exclusions: or_empty("exclusions", id, exclusions),
        itinerary: or_empty("itinerary", id, itinerary),
        accommodations: or_empty("accommodations", id, accommodations),
        faqs: or_empty("faqs", id, faqs),
    }))
}

fn or_empty<T>(section: &str, package_id: u64, result: CoreResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Package {} {} unavailable: {}", package_id, section, e);
        Vec::new()
    })
}
