//! Order history for the logged-in customer.

use super::common::{map_service_error, success_response};
use crate::errors::ApiError;
use crate::session_cart::current_customer_id;
use crate::AppState;
use axum::{extract::State, response::Response, routing::get, Router};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;

pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_orders))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let Some(customer_id) = current_customer_id(&session)
        .await
        .map_err(map_service_error)?
    else {
        // guests simply have no history
        return Ok(success_response(json!({ "orders": [] })));
    };

    let orders = state
        .services
        .checkout
        .list_orders(customer_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "orders": orders })))
}
