use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{extract::State, http::StatusCode, routing::post, Router};
use rand::rngs::OsRng;
use serde::Serialize;
use tracing::info;
use tripway_core::user::{normalize_email, LoginRequest, NewUser, RegisterRequest, User};
use tripway_shared::{pii::mask_email, Masked};

use crate::{error::AppError, extract::Json, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Serialize)]
struct AuthResponse {
    success: bool,
    message: String,
    token: String,
    user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

/// POST /api/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let password_hash = hash_password(req.password).await?;
    let user = state
        .users
        .create_user(NewUser {
            name: req.name,
            email: normalize_email(&req.email),
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            password_hash,
        })
        .await?;

    info!("Registered user {} ({})", user.id, mask_email(&user.email));
    let token = issue_token(&state.auth, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Registration successful".to_string(),
            token,
            user,
        }),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::AuthenticationError("Invalid email or password".to_string());

    let credentials = state
        .users
        .find_credentials(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(req.password, credentials.password_hash).await? {
        return Err(invalid());
    }

    let user = credentials.user;
    let token = issue_token(&state.auth, &user)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

// Argon2 blocks for tens of milliseconds; both directions run on the blocking pool.

async fn hash_password(password: Masked<String>) -> Result<Masked<String>, AppError> {
    let hashed = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok(Masked(hashed))
}

async fn verify_password(password: Masked<String>, stored: Masked<String>) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::parse(stored.expose(), Encoding::default())
            .map_err(|e| anyhow::anyhow!("stored password hash is unreadable: {}", e))?;
        Ok::<_, anyhow::Error>(
            Argon2::default()
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password(Masked("correct horse".to_string())).await.unwrap();
        assert!(hash.expose().starts_with("$argon2"));
        assert!(verify_password(Masked("correct horse".to_string()), hash.clone()).await.unwrap());
        assert!(!verify_password(Masked("wrong".to_string()), hash).await.unwrap());
    }
}
