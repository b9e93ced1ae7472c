//! boutique-api: a JSON storefront backend.
//!
//! Catalog browsing, a cookie-session shopping cart that merges into a
//! persisted per-customer cart at login, transactional checkout, wishlists
//! and customer accounts.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod pricing;
pub mod services;
pub mod session_cart;

use axum::{routing::get, Json, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// The full API surface, ready for `with_state(Arc<AppState>)` and the
/// session/trace layers applied in `main`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", handlers::auth_routes())
        .merge(handlers::catalog_routes())
        .nest("/cart", handlers::cart_routes())
        .nest("/checkout", handlers::checkout_routes())
        .nest("/orders", handlers::orders_routes())
        .nest("/wishlist", handlers::wishlist_routes())
        .nest("/contact", handlers::contact_routes())
}
