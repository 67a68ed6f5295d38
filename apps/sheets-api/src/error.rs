use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::json_response;

/// Message shown to callers in place of error details outside development.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Error envelope returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub ok: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// Application-level error. Each variant fixes the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    MethodNotAllowed(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::MethodNotAllowed(m)
            | Self::Internal(m) => m,
        }
    }

    /// Build the client-facing response, hiding details unless `expose_details`.
    ///
    /// The full message is always logged.
    pub fn into_envelope(self, expose_details: bool) -> Response {
        let status = self.status();
        if log_level(status) == tracing::Level::ERROR {
            tracing::error!(status = status.as_u16(), error = %self.message(), "API error");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.message(), "request rejected");
        }

        let message = if expose_details {
            self.message().to_string()
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        };
        json_response(status, &ErrorEnvelope::new(message))
    }
}

/// Rejections of client input are warnings; only server faults are errors.
fn log_level(status: StatusCode) -> tracing::Level {
    if status.is_server_error() {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

/// Direct conversion used outside the top-level handler (e.g. extractor
/// rejections); always exposes the message.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(self.status(), &ErrorEnvelope::new(self.message()))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!(?err, "spreadsheet request failed");
        Self::internal(format!("Spreadsheet service error: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(?err, "service account assertion failed");
        Self::internal(format!("Failed to sign service account assertion: {err}"))
    }
}
