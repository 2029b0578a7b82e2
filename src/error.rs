// Request-level error type and its HTTP rendering.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Task not found")]
    TaskNotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::WeakPassword(_)
            | AppError::InvalidInput(_)
            | AppError::DuplicateUsername
            | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TaskNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Hash(_)
            | AppError::Token(_)
            | AppError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Todo lookups answer with "message", everything else with "msg"
        let body = match &self {
            AppError::TaskNotFound => json!({ "message": self.to_string() }),
            _ if status.is_server_error() => {
                error!(error = %self, "request failed");
                json!({ "msg": "Internal server error" })
            }
            _ => json!({ "msg": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
