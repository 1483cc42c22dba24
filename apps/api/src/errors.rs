use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::quality::QualityError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Attempt limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Quality control failed: {0}")]
    Quality(#[from] QualityError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Expired(msg) => (StatusCode::GONE, "EXPIRED", msg.clone()),
            AppError::LimitExceeded(msg) => {
                (StatusCode::FORBIDDEN, "LIMIT_EXCEEDED", msg.clone())
            }
            AppError::Generation(e) => {
                tracing::warn!("Generation error: {e}");
                let (status, code) = match e {
                    GenerationError::RateLimited => {
                        (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_RATE_LIMITED")
                    }
                    GenerationError::Timeout => {
                        (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT")
                    }
                    GenerationError::MalformedOutput(_) => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_MALFORMED_OUTPUT")
                    }
                    GenerationError::WrongCount { .. } => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_WRONG_COUNT")
                    }
                    GenerationError::Upstream(_) => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_UPSTREAM_ERROR")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Quality(e) => {
                tracing::error!("Quality control error: {e}");
                (StatusCode::BAD_GATEWAY, "QUALITY_ERROR", e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::Expired("x".into())), StatusCode::GONE);
        assert_eq!(
            status_of(AppError::LimitExceeded("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(GenerationError::RateLimited.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(GenerationError::Timeout.into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(
                GenerationError::WrongCount {
                    expected: 10,
                    actual: 7
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                QualityError::WrongQuestionCount {
                    expected: 10,
                    actual: 9
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(sqlx::Error::RowNotFound.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
