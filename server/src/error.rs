//! Error types for the link reservation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::availability::BookingRule;
use crate::domain::link::LinkStatus;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the link reservation server
#[derive(Debug, Error)]
pub enum Error {
    // Link errors (2000-2999)
    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Link {id} is not bookable in status {status}")]
    LinkNotBookable { id: String, status: LinkStatus },

    // Reservation errors (3000-3999)
    #[error("Link {0} is reserved by another session")]
    ReservationConflict(String),

    #[error("Booking constraint violated: {rule}")]
    RuleViolation { rule: BookingRule },

    #[error("Link {0} has no active reservation")]
    NoActiveReservation(String),

    // Infrastructure errors (6000-6999)
    #[error("Database error: {0}")]
    Database(String),

    // General errors (1000-1999)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code
    pub fn code(&self) -> u32 {
        match self {
            // Link errors (2000-2999)
            Error::LinkNotFound(_) => 2001,
            Error::LinkNotBookable { .. } => 2002,

            // Reservation errors (3000-3999)
            Error::ReservationConflict(_) => 3001,
            Error::RuleViolation { .. } => 3002,
            Error::NoActiveReservation(_) => 3003,

            // Infrastructure errors (6000-6999)
            Error::Database(_) => 6001,

            // General errors (1000-1999)
            Error::Validation(_) => 1001,
            Error::Internal(_) => 1002,
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::LinkNotFound(_) => StatusCode::NOT_FOUND,

            Error::ReservationConflict(_) => StatusCode::CONFLICT,

            Error::LinkNotBookable { .. }
            | Error::RuleViolation { .. }
            | Error::NoActiveReservation(_)
            | Error::Validation(_) => StatusCode::BAD_REQUEST,

            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Error::RuleViolation { rule } => Some(rule.as_str().to_string()),
            _ => None,
        };
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.to_string())
    }
}
