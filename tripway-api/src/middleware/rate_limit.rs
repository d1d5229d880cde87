use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::state::AppState;

const WINDOW_SECONDS: u64 = 60;

/// Per-IP request budget per minute. Requests without a peer address (in-process
/// calls) and requests arriving while the store is unreachable pass through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied() else {
        return next.run(req).await;
    };

    let key = format!("ratelimit:{}", addr.ip());
    match state.ephemeral.hit(&key, WINDOW_SECONDS).await {
        Ok(count) if count > state.business_rules.rate_limit_per_minute => {
            tracing::warn!("Rate limit exceeded for {}", addr.ip());
            crate::error::AppError::TooManyRequests.into_response()
        }
        Ok(_) => next.run(req).await,
        Err(_) => next.run(req).await, // Fail open
    }
}
