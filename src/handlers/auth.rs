//! Signup, login and logout. Login is where the session cart and the
//! persistent cart meet: merge first, then reload the merged cart into the
//! session.

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::entities::customer;
use crate::errors::ApiError;
use crate::services::customers::RegisterInput;
use crate::session_cart::{self, SessionCart};
use crate::AppState;
use axum::{extract::State, response::Response, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::warn;
use validator::Validate;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of a customer record.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<customer::Model> for CustomerResponse {
    fn from(c: customer::Model) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
        }
    }
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .customers
        .register(RegisterInput {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            address: payload.address,
            city: payload.city,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Account created. You can log in now.",
        "customer": CustomerResponse::from(created),
    })))
}

async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let customer = state
        .services
        .customers
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(map_service_error)?;

    // Fold the guest cart into the persistent one, then make the merged
    // result the session cart. A sync failure is logged, never a login
    // blocker.
    let guest_cart = SessionCart::load(&session)
        .await
        .map_err(map_service_error)?;
    if !guest_cart.is_empty() {
        if let Err(err) = state
            .services
            .carts
            .merge_session_cart(customer.id, &guest_cart)
            .await
        {
            warn!(customer_id = customer.id, error = %err, "cart merge failed during login");
        }
    }
    match state.services.carts.load_session_cart(customer.id).await {
        Ok(merged) => merged.store(&session).await.map_err(map_service_error)?,
        Err(err) => {
            warn!(customer_id = customer.id, error = %err, "could not load persistent cart");
        }
    }

    session_cart::sign_in(&session, customer.id, &customer.first_name)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": format!("Welcome back, {}!", customer.first_name),
        "customer": CustomerResponse::from(customer),
    })))
}

async fn logout(session: Session) -> Result<Response, ApiError> {
    session_cart::sign_out(&session)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "message": "Logged out" })))
}
