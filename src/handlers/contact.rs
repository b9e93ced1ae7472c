//! Contact-form endpoint.

use super::common::{created_response, map_service_error, validate_input};
use crate::errors::ApiError;
use crate::services::contact::ContactInput;
use crate::AppState;
use axum::{extract::State, response::Response, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

pub fn contact_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(submit_contact))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let message = state
        .services
        .contact
        .submit(ContactInput {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            subject: payload.subject,
            message: payload.message,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Thanks for reaching out. We'll get back to you soon.",
        "id": message.id,
    })))
}
