//! HTTP layer: route builders, request DTOs and the service container.

pub mod auth;
pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod common;
pub mod contact;
pub mod orders;
pub mod wishlist;

pub use auth::auth_routes;
pub use carts::cart_routes;
pub use catalog::catalog_routes;
pub use checkout::checkout_routes;
pub use contact::contact_routes;
pub use orders::orders_routes;
pub use wishlist::wishlist_routes;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    CartService, CatalogService, CheckoutService, ContactService, CustomerService, WishlistService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Aggregated services handed to every handler through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub carts: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub customers: Arc<CustomerService>,
    pub wishlist: Arc<WishlistService>,
    pub contact: Arc<ContactService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db.clone())),
            carts: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            checkout: Arc::new(CheckoutService::new(
                db.clone(),
                event_sender.clone(),
                config,
            )),
            customers: Arc::new(CustomerService::new(db.clone(), event_sender.clone())),
            wishlist: Arc::new(WishlistService::new(db.clone(), event_sender.clone())),
            contact: Arc::new(ContactService::new(db, event_sender)),
        }
    }
}
