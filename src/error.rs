//! Error types for the Athenaeum server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type.
///
/// Every business precondition failure maps to exactly one variant here; the
/// API layer turns the variant into a status code and a stable machine
/// readable kind string.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    NotAuthenticated,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("no copies available")]
    NotAvailable,

    #[error("loan has already been returned")]
    AlreadyReturned,

    #[error("reservation has already been resolved")]
    AlreadyResolved,

    #[error("loan belongs to another member")]
    NotOwner,

    #[error("a pending reservation already exists for this book")]
    DuplicateReservation,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("a book with this ISBN already exists")]
    DuplicateIsbn,

    #[error("member has open loans or pending reservations")]
    HasOpenObligations,

    #[error("cannot remove the last administrator")]
    LastAdministrator,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable identifier used in API responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotAuthenticated => "not_authenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound(_) => "not_found",
            AppError::NotAvailable => "not_available",
            AppError::AlreadyReturned => "already_returned",
            AppError::AlreadyResolved => "already_resolved",
            AppError::NotOwner => "not_owner",
            AppError::DuplicateReservation => "duplicate_reservation",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidIsbn(_) => "invalid_isbn",
            AppError::DuplicateIsbn => "duplicate_isbn",
            AppError::HasOpenObligations => "has_open_obligations",
            AppError::LastAdministrator => "last_administrator",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "service_unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotOwner => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotAvailable
            | AppError::AlreadyReturned
            | AppError::AlreadyResolved
            | AppError::DuplicateReservation
            | AppError::DuplicateEmail
            | AppError::DuplicateIsbn
            | AppError::HasOpenObligations
            | AppError::LastAdministrator => StatusCode::CONFLICT,
            AppError::InvalidIsbn(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The store failure path is the only non-domain fault; its details
        // stay in the logs, not in the response.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Service temporarily unavailable".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_a_status() {
        // Lookup miss and hash mismatch must be indistinguishable to callers.
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::InvalidCredentials.kind(), "invalid_credentials");
    }

    #[test]
    fn precondition_failures_are_conflicts() {
        for err in [
            AppError::NotAvailable,
            AppError::AlreadyReturned,
            AppError::AlreadyResolved,
            AppError::DuplicateReservation,
            AppError::HasOpenObligations,
            AppError::LastAdministrator,
        ] {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn store_failure_is_surfaced_as_unavailable() {
        let err = AppError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), "service_unavailable");
    }
}
