use axum::{
    http::{header, Method, Uri},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod destinations;
pub mod error;
pub mod extract;
pub mod hotels;
pub mod middleware;
pub mod notifications;
pub mod packages;
pub mod state;
pub mod users;

pub use error::AppError;
pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::USER_AGENT]);

    Router::new()
        .merge(auth::routes())
        .merge(users::routes(&state))
        .merge(bookings::routes())
        .merge(hotels::routes())
        .merge(destinations::routes())
        .merge(packages::routes())
        .merge(notifications::routes())
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFoundError(format!("No route for {}", uri.path()))
}
