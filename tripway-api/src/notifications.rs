use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tripway_core::notify::{confirmation_code_sms, ConfirmationEmailRequest};
use tripway_core::reference::generate_confirmation_code;
use tripway_core::user::normalize_phone;
use tripway_shared::pii::{mask_email, mask_phone};

use crate::error::AppError;
use crate::extract::Json;
use crate::state::AppState;

/// Wrong guesses allowed per code before it is discarded.
const MAX_CODE_ATTEMPTS: u64 = 5;

#[derive(Debug, Serialize)]
struct NotificationResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendCodeRequest {
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyCodeRequest {
    phone: Option<String>,
    code: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/send-confirmation-email", post(send_confirmation_email))
        .route("/api/send-confirmation-code", post(send_confirmation_code))
        .route("/api/verify-confirmation-code", post(verify_confirmation_code))
}

/// POST /api/send-confirmation-email
async fn send_confirmation_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmationEmailRequest>,
) -> Result<Json<NotificationResponse>, AppError> {
    if req.to.trim().is_empty() || !req.to.contains('@') {
        return Err(AppError::ValidationError("to must be an email address".to_string()));
    }

    let message = req.into_message();
    state.email.send_email(&message).await?;

    info!("Confirmation email sent to {}", mask_email(&message.to));
    Ok(Json(NotificationResponse {
        success: true,
        message: "Confirmation email sent".to_string(),
    }))
}

/// POST /api/send-confirmation-code
///
/// Stores a fresh six digit code under the phone number, replacing any earlier
/// one, then texts it.
async fn send_confirmation_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<Json<NotificationResponse>, AppError> {
    let phone = required_phone(req.phone)?;
    let ttl = state.business_rules.confirmation_code_ttl_seconds;
    let code = generate_confirmation_code();

    state.ephemeral.put_code(&code_key(&phone), &code, ttl).await?;
    state.ephemeral.delete(&attempts_key(&phone)).await?;
    state
        .sms
        .send_sms(&confirmation_code_sms(&phone, &code, ttl))
        .await?;

    info!("Confirmation code sent to {}", mask_phone(&phone));
    Ok(Json(NotificationResponse {
        success: true,
        message: "Confirmation code sent".to_string(),
    }))
}

/// POST /api/verify-confirmation-code
///
/// A matching code is consumed. After `MAX_CODE_ATTEMPTS` wrong guesses the code
/// is dropped and a new one must be requested.
async fn verify_confirmation_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<NotificationResponse>, AppError> {
    let phone = required_phone(req.phone)?;
    let code = req.code.map(|c| c.trim().to_string()).unwrap_or_default();
    if code.is_empty() {
        return Err(AppError::MissingFields(vec!["code".to_string()]));
    }

    let key = code_key(&phone);
    if state.ephemeral.take_code(&key, &code).await? {
        state.ephemeral.delete(&attempts_key(&phone)).await?;
        info!("Phone {} verified", mask_phone(&phone));
        return Ok(Json(NotificationResponse {
            success: true,
            message: "Phone number verified".to_string(),
        }));
    }

    let ttl = state.business_rules.confirmation_code_ttl_seconds;
    let failures = state.ephemeral.hit(&attempts_key(&phone), ttl).await?;
    if failures >= MAX_CODE_ATTEMPTS {
        warn!("Too many wrong codes for {}; code invalidated", mask_phone(&phone));
        state.ephemeral.delete(&key).await?;
    }

    Err(AppError::ValidationError(
        "Invalid or expired confirmation code".to_string(),
    ))
}

fn required_phone(phone: Option<String>) -> Result<String, AppError> {
    phone
        .map(|p| normalize_phone(&p))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::MissingFields(vec!["phone".to_string()]))
}

fn code_key(phone: &str) -> String {
    format!("confirmation:{}", phone)
}

fn attempts_key(phone: &str) -> String {
    format!("confirmation_attempts:{}", phone)
}
