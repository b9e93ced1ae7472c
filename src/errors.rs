use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub timestamp: String,
}

/// Error type shared by all services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_)
            | ServiceError::InvalidInput(_)
            | ServiceError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ServiceError::AuthError(_) | ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::DatabaseError(_)
            | ServiceError::SessionError(_)
            | ServiceError::SerializationError(_)
            | ServiceError::InternalError(_)
            | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients. Infrastructure failures collapse to a
    /// generic message; the detail goes to the logs only.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::DatabaseError(_)
            | ServiceError::SessionError(_)
            | ServiceError::SerializationError(_)
            | ServiceError::InternalError(_)
            | ServiceError::Other(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "Not Found",
            ServiceError::ValidationError(_)
            | ServiceError::InvalidInput(_)
            | ServiceError::InvalidOperation(_) => "Bad Request",
            ServiceError::AuthError(_) | ServiceError::Unauthorized(_) => "Unauthorized",
            _ => "Internal Server Error",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

impl From<tower_sessions::session::Error> for ServiceError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ServiceError::SessionError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.reason().to_string(),
            message: self.response_message(),
            error_code: None,
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler-level error carrying an optional machine-readable code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        error_code: Option<String>,
    },
    Unauthorized {
        message: String,
        error_code: Option<String>,
    },
    NotFound {
        message: String,
        error_code: Option<String>,
    },
    InternalServerError {
        message: String,
        error_code: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            error_code: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            error_code: None,
        }
    }

    /// 401 with the `login_required` code, returned wherever a browser
    /// storefront would have redirected the visitor to the login page.
    pub fn login_required() -> Self {
        ApiError::Unauthorized {
            message: "Please log in to continue".to_string(),
            error_code: Some("login_required".to_string()),
        }
    }

    fn parts(self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            ApiError::BadRequest {
                message,
                error_code,
            } => (StatusCode::BAD_REQUEST, "Bad Request", message, error_code),
            ApiError::Unauthorized {
                message,
                error_code,
            } => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                message,
                error_code,
            ),
            ApiError::NotFound {
                message,
                error_code,
            } => (StatusCode::NOT_FOUND, "Not Found", message, error_code),
            ApiError::InternalServerError {
                message,
                error_code,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                message,
                error_code,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason, message, error_code) = self.parts();
        if status.is_server_error() {
            tracing::error!(%message, "request failed");
        }
        let body = ErrorResponse {
            error: reason.to_string(),
            message,
            error_code,
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}
