use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    #[error("Message content cannot be empty")]
    EmptyContent,

    #[error("Unknown conversation: {0}")]
    UnknownConversation(String),

    #[error("Forbidden sender: {0}")]
    ForbiddenSender(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl AppError {
    /// Transient infrastructure failures are safe to retry with
    /// backoff; everything else needs a changed input.
    pub fn is_retriable(&self) -> bool {
        matches!(self, AppError::Timeout | AppError::Unavailable(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => AppError::Unavailable(err.to_string()),
            other => AppError::Database(other),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::InvalidParticipants(ref msg) => {
                tracing::debug!("Invalid participants: {}", msg);
                (StatusCode::BAD_REQUEST, "invalid_participants", msg.clone())
            }
            AppError::EmptyContent => {
                tracing::debug!("Empty content");
                (StatusCode::BAD_REQUEST, "empty_content", self.to_string())
            }
            AppError::UnknownConversation(ref msg) => {
                tracing::debug!("Unknown conversation: {}", msg);
                (StatusCode::NOT_FOUND, "unknown_conversation", msg.clone())
            }
            AppError::ForbiddenSender(ref msg) => {
                tracing::debug!("Forbidden sender: {}", msg);
                (StatusCode::FORBIDDEN, "forbidden_sender", msg.clone())
            }
            AppError::NotFound(ref msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "not_found", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                tracing::debug!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Timeout => {
                tracing::warn!("Operation timed out");
                (StatusCode::GATEWAY_TIMEOUT, "timeout", self.to_string())
            }
            AppError::Unavailable(ref msg) => {
                tracing::error!("Backend unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone())
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    self.to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        assert!(AppError::Timeout.is_retriable());
        assert!(AppError::Unavailable("down".to_string()).is_retriable());
        assert!(!AppError::EmptyContent.is_retriable());
        assert!(!AppError::InvalidParticipants("u1".to_string()).is_retriable());
        assert!(!AppError::ForbiddenSender("u3".to_string()).is_retriable());
        assert!(!AppError::UnknownConversation("x".to_string()).is_retriable());
    }

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Unavailable(_)));

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
