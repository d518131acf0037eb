use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use types::errors::GameError;

/// Central error type for the gateway
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Game(err) => {
                let status = match &err {
                    GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    GameError::InvalidState(_) => StatusCode::CONFLICT,
                    GameError::NotFound(_) => StatusCode::NOT_FOUND,
                    GameError::NotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    GameError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                // Internal details stay in the logs, not on the wire
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(%err, "internal error");
                    "Internal server error".to_string()
                } else {
                    err.to_string()
                };
                (status, err.code(), message)
            }
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED", msg)
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
