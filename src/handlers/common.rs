//! Helpers shared by all HTTP handlers.

use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// 200 with a JSON body.
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 201 with a JSON body.
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Run derive-based validation on a request DTO.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input.validate().map_err(|errors| ApiError::BadRequest {
        message: format!("Validation failed: {errors}"),
        error_code: Some("validation_failed".to_string()),
    })
}

/// Translate a service failure into the handler-level error shape.
pub fn map_service_error(err: ServiceError) -> ApiError {
    let message = err.response_message();
    match err.status_code() {
        StatusCode::NOT_FOUND => ApiError::NotFound {
            message,
            error_code: None,
        },
        StatusCode::BAD_REQUEST => ApiError::BadRequest {
            message,
            error_code: None,
        },
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized {
            message,
            error_code: None,
        },
        _ => ApiError::InternalServerError {
            message,
            error_code: None,
        },
    }
}
