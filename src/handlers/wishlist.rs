//! Wishlist endpoints. All of them require a logged-in customer.

use super::common::{created_response, map_service_error, success_response};
use crate::entities::ProductKind;
use crate::errors::ApiError;
use crate::session_cart::current_customer_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;

pub fn wishlist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/items/:kind/:id", post(add_to_wishlist))
        .route("/items/:id", delete(remove_from_wishlist))
}

async fn require_customer(session: &Session) -> Result<i64, ApiError> {
    current_customer_id(session)
        .await
        .map_err(map_service_error)?
        .ok_or_else(ApiError::login_required)
}

async fn list_wishlist(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let customer_id = require_customer(&session).await?;
    let entries = state
        .services
        .wishlist
        .list(customer_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "items": entries })))
}

async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((kind_tag, id)): Path<(String, i64)>,
) -> Result<Response, ApiError> {
    let customer_id = require_customer(&session).await?;
    let kind = ProductKind::from_tag(&kind_tag)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown product kind: {kind_tag}")))?;

    let (entry, created) = state
        .services
        .wishlist
        .add(customer_id, kind, id)
        .await
        .map_err(map_service_error)?;

    let body = json!({
        "message": if created {
            format!("'{}' added to your wishlist", entry.title)
        } else {
            format!("'{}' is already in your wishlist", entry.title)
        },
        "id": entry.id,
        "created": created,
    });
    Ok(if created {
        created_response(body)
    } else {
        success_response(body)
    })
}

async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let customer_id = require_customer(&session).await?;
    state
        .services
        .wishlist
        .remove(customer_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "message": "Removed from wishlist" })))
}
