//! Application error type.
//!
//! Every fallible operation in the workspace returns `AppResult<T>`. Errors
//! are converted into an `ApiResponse` error body at the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Unified error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// No connection is configured under the requested name.
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    /// The database server could not be reached.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// A query or command against the database server failed.
    #[error("database query error: {0}")]
    DatabaseQuery(String),

    /// Caller-supplied input failed shape checks.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested database, collection or document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ConnectionNotFound(_) => "CONNECTION_NOT_FOUND",
            AppError::DatabaseConnection(_) => "DATABASE_CONNECTION_ERROR",
            AppError::DatabaseQuery(_) => "DATABASE_QUERY_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ConnectionNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseConnection(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseQuery(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = ApiResponse::err(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("doc".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("db".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseConnection("refused".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            AppError::ConnectionNotFound("local".into()).code(),
            "CONNECTION_NOT_FOUND"
        );
        assert_eq!(AppError::DatabaseQuery("boom".into()).code(), "DATABASE_QUERY_ERROR");
    }
}
