use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ExternalServiceError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

// Upstream fetch failures and unparseable bulletins both surface as 502:
// the request was valid, the provider side was not.
impl From<crate::services::ec::FetchError> for AppError {
    fn from(err: crate::services::ec::FetchError) -> Self {
        AppError::ExternalServiceError(err.to_string())
    }
}

impl From<crate::services::bulletin::BulletinError> for AppError {
    fn from(err: crate::services::bulletin::BulletinError) -> Self {
        AppError::ExternalServiceError(err.to_string())
    }
}

// A geo miss means no station/city inside the search window: 404, not 500.
impl From<crate::services::geo::GeoError> for AppError {
    fn from(err: crate::services::geo::GeoError) -> Self {
        AppError::NotFound(err.to_string())
    }
}
