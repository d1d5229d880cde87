use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use tripway_core::booking::{Booking, BookingType, CreateBookingRequest, UpdateBookingStatusRequest};
use tripway_core::notify::ConfirmationEmailRequest;
use tripway_core::pricing::PriceQuote;
use tripway_shared::pii::mask_email;

use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct CreateBookingResponse {
    success: bool,
    message: String,
    booking_id: String,
    id: u64,
    total_price: f64,
}

#[derive(Debug, Serialize)]
struct UpdateBookingResponse {
    success: bool,
    message: String,
    booking: Booking,
}

#[derive(Debug, Serialize)]
struct CancelBookingResponse {
    success: bool,
    message: String,
}

/// Body of `POST /api/bookings/quote`. A package id wins over a raw unit price.
#[derive(Debug, Deserialize)]
struct QuoteRequest {
    package_id: Option<u64>,
    unit_price: Option<f64>,
    adults: u32,
    #[serde(default)]
    children: u32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/quote", post(quote))
        .route("/api/bookings/user/{user_id}", get(list_user_bookings))
        .route("/api/bookings/cancel/{booking_id}", post(cancel_booking))
        .route(
            "/api/bookings/{booking_id}",
            get(get_booking).patch(update_booking_status),
        )
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let mut booking = req.validate()?;

    if let (BookingType::Package, Some(package_id)) = (booking.booking_type, booking.package_id) {
        let server = quote_package(&state, package_id, booking.adults, booking.children).await?;
        if !server.agrees_with(booking.total_price) {
            warn!(
                "Client total {} for booking {} differs from server total {}; storing server value",
                booking.total_price, booking.booking_id, server.total
            );
        }
        booking.total_price = server.total;
    }

    let contact_email = booking.contact_email.clone();
    let created = state.bookings.create_booking(booking).await?;
    info!("Booking {} created for user {}", created.booking_id, created.user_id);

    if let Some(to) = contact_email {
        send_booking_email(&state, to, &created);
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            message: "Booking created successfully".to_string(),
            booking_id: created.booking_id,
            id: created.id,
            total_price: created.total_price,
        }),
    ))
}

/// GET /api/bookings
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_bookings().await?))
}

/// GET /api/bookings/{booking_id}
/// Answers with an array: one element when found, empty otherwise.
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let booking = state.bookings.get_booking(&booking_id).await?;
    Ok(Json(booking.into_iter().collect()))
}

/// GET /api/bookings/user/{user_id}
async fn list_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_user_bookings(user_id).await?))
}

/// PATCH /api/bookings/{booking_id}
async fn update_booking_status(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<UpdateBookingResponse>, AppError> {
    let patch = req.validate()?;
    let booking = state.bookings.update_booking(&booking_id, patch).await?;

    info!(
        "Booking {} now {} / {}",
        booking.booking_id, booking.status, booking.payment_status
    );
    Ok(Json(UpdateBookingResponse {
        success: true,
        message: "Booking updated successfully".to_string(),
        booking,
    }))
}

/// POST /api/bookings/cancel/{booking_id}
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    if !state.bookings.delete_booking(&booking_id).await? {
        return Err(AppError::NotFoundError(format!("Booking {} not found", booking_id)));
    }

    info!("Booking {} cancelled", booking_id);
    Ok(Json(CancelBookingResponse {
        success: true,
        message: "Booking cancelled successfully".to_string(),
    }))
}

/// POST /api/bookings/quote
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, AppError> {
    if req.adults == 0 {
        return Err(AppError::ValidationError("adults must be at least 1".to_string()));
    }

    let quote = match (req.package_id, req.unit_price) {
        (Some(package_id), _) => quote_package(&state, package_id, req.adults, req.children).await?,
        (None, Some(price)) if price.is_finite() && price >= 0.0 => {
            state.business_rules.pricing().quote(req.adults, req.children, price)
        }
        (None, Some(_)) => {
            return Err(AppError::ValidationError("unit_price must be a non-negative number".to_string()))
        }
        (None, None) => return Err(AppError::MissingFields(vec!["package_id".to_string()])),
    };

    Ok(Json(quote))
}

async fn quote_package(
    state: &AppState,
    package_id: u64,
    adults: u32,
    children: u32,
) -> Result<PriceQuote, AppError> {
    let package = state
        .packages
        .get_package(package_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Package {} not found", package_id)))?;

    Ok(state
        .business_rules
        .pricing()
        .quote(adults, children, package.unit_price()))
}

/// Fire-and-forget: the booking is already committed, a failed send is only logged.
fn send_booking_email(state: &AppState, to: String, booking: &Booking) {
    let message = ConfirmationEmailRequest {
        to,
        booking_id: booking.booking_id.clone(),
        name: None,
        details: Some(json!({
            "travel_date": booking.travel_date.to_string(),
            "adults": booking.adults,
            "children": booking.children,
            "total_price": booking.total_price,
        })),
    }
    .into_message();

    let email = state.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email.send_email(&message).await {
            warn!("Confirmation email to {} failed: {}", mask_email(&message.to), e);
        }
    });
}
