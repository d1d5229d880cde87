use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tripway_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    MissingFields(Vec<String>),
    NotFoundError(String),
    ConflictError(String),
    UpstreamError(String),
    TooManyRequests,
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, "authentication_error"),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, "authorization_error"),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "validation_error"),
            AppError::MissingFields(fields) => {
                let body = Json(json!({
                    "success": false,
                    "message": format!("Missing required fields: {}", fields.join(", ")),
                    "error": "validation_error",
                    "missing_fields": fields,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, "not_found"),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, "conflict"),
            AppError::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg, "upstream_error"),
            AppError::TooManyRequests => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string(), "rate_limited")
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), "internal_error")
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), "internal_error")
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": error,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::ValidationError(msg),
            CoreError::MissingFields(fields) => AppError::MissingFields(fields),
            CoreError::NotFound(what) => AppError::NotFoundError(format!("{} not found", what)),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::Unauthorized(msg) => AppError::AuthenticationError(msg),
            CoreError::Forbidden(msg) => AppError::AuthorizationError(msg),
            CoreError::Upstream(msg) => AppError::UpstreamError(msg),
            CoreError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

// Malformed bodies, paths and query strings are client errors.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_body() {
        let err = AppError::from(CoreError::MissingFields(vec!["user_id".into(), "adults".into()]));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["missing_fields"], json!(["user_id", "adults"]));
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_details() {
        let err = AppError::from(CoreError::Internal("Duplicate entry 'x' for key 'PRIMARY'".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert!(!body.to_string().contains("Duplicate entry"));
    }

    #[tokio::test]
    async fn test_not_found_mapping() {
        let (status, body) = body_json(CoreError::NotFound("Booking BK1".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Booking BK1 not found");
        assert_eq!(body["error"], "not_found");
    }
}
