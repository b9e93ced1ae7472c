//! Checkout quote and order placement.

use super::common::{map_service_error, success_response};
use crate::errors::ApiError;
use crate::services::checkout::PlaceOrderInput;
use crate::session_cart::{current_customer_id, SessionCart};
use crate::AppState;
use axum::{extract::State, response::Response, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;

pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(checkout_quote).post(place_order))
}

async fn checkout_quote(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    if cart.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Your cart is empty".to_string(),
            error_code: Some("cart_empty".to_string()),
        });
    }
    Ok(success_response(state.services.checkout.quote(&cart)))
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<PlaceOrderInput>,
) -> Result<Response, ApiError> {
    let customer_id = current_customer_id(&session)
        .await
        .map_err(map_service_error)?
        .ok_or_else(ApiError::login_required)?;

    let mut cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    if cart.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Your cart is empty".to_string(),
            error_code: Some("cart_empty".to_string()),
        });
    }

    let order = state
        .services
        .checkout
        .place_order(customer_id, payload, &cart)
        .await
        .map_err(map_service_error)?;

    // the order owns the lines now
    cart.clear();
    cart.store(&session).await.map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": format!("Order #{} placed. Thank you!", order.id),
        "order_id": order.id,
        "total": order.total,
    })))
}
