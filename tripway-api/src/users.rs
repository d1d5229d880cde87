use axum::{
    extract::State,
    middleware,
    routing::{get, put},
    Extension, Router,
};
use serde::Serialize;
use tripway_core::user::{ProfileUpdate, User};

use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::{require_user, UserClaims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ProfileResponse {
    success: bool,
    message: String,
    user: User,
}

pub fn routes(state: &AppState) -> Router<AppState> {
    // Reads are public; only the owner may write.
    let protected = put(update_user).route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_user,
    ));

    Router::new().route("/api/users/{id}", get(get_user).merge(protected))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("User {} not found", id)))?;

    Ok(Json(user))
}

/// PUT /api/users/{id}
/// Only the account owner may change the profile.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Extension(claims): Extension<UserClaims>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    if claims.user_id() != Some(id) {
        return Err(AppError::AuthorizationError(
            "You can only update your own profile".to_string(),
        ));
    }
    update.validate()?;

    let user = state
        .users
        .update_profile(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("User {} not found", id)))?;

    tracing::info!("Profile updated for user {}", id);
    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated".to_string(),
        user,
    }))
}
