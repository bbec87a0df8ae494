//! Error types with HTTP status code mapping.

use hyper::StatusCode;

use crate::outcome::Reason;
use crate::response::{self, HttpResponse};
use crate::role::Role;

/// Error type for warden operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Access errors
    #[error("Forbidden: {0}")]
    Forbidden(Reason),

    #[error("Insufficient role: have {actual}, need {required}")]
    InsufficientRole { actual: Role, required: Role },

    // Data errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // System errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Forbidden(reason) => reason.status_code(),
            Error::InsufficientRole { .. } => StatusCode::FORBIDDEN,

            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,

            Error::CorruptData(_)
            | Error::Config(_)
            | Error::Json(_)
            | Error::Database(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason code for access failures.
    pub fn reason(&self) -> Option<Reason> {
        match self {
            Error::Forbidden(reason) => Some(*reason),
            Error::InsufficientRole { .. } => Some(Reason::InsufficientRole),
            _ => None,
        }
    }

    /// Convert error into HTTP response.
    pub fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Internal error: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut body = serde_json::json!({ "error": message });
        if let Some(reason) = self.reason() {
            body["reason"] = reason.as_str().into();
        }
        if let Error::InsufficientRole { actual, required } = &self {
            body["actual"] = actual.as_str().into();
            body["required"] = required.as_str().into();
        }

        response::json_value(status, &body)
    }
}

/// Result type alias using warden's Error.
pub type Result<T> = std::result::Result<T, Error>;
