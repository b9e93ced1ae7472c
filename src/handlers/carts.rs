//! Session cart endpoints. Guests mutate only the session; logged-in
//! customers additionally write through to their persistent cart.

use super::common::{map_service_error, success_response};
use crate::entities::{product, ProductKind};
use crate::errors::ApiError;
use crate::events::Event;
use crate::pricing::{self, Size};
use crate::services::cart::QuantityChange;
use crate::services::catalog::PLACEHOLDER_IMAGE;
use crate::session_cart::{current_customer_id, CartKey, SessionCart, SessionItem};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::warn;

pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(cart_detail).put(update_cart))
        .route("/items/:kind/:id", post(add_to_cart))
        .route("/items/:key", delete(remove_from_cart))
}

#[derive(Debug, Default, Deserialize)]
struct AddToCartRequest {
    size: Option<String>,
}

/// A cart line as shown to the customer.
#[derive(Debug, Serialize)]
struct CartLine {
    key: String,
    kind: ProductKind,
    item_id: i64,
    name: String,
    image: String,
    size: String,
    quantity: u32,
    unit_price: Decimal,
    line_total: Decimal,
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((kind_tag, id)): Path<(String, i64)>,
    payload: Option<Json<AddToCartRequest>>,
) -> Result<Response, ApiError> {
    let kind = ProductKind::from_tag(&kind_tag)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown product kind: {kind_tag}")))?;
    let product = state
        .services
        .catalog
        .get_item(kind, id)
        .await
        .map_err(map_service_error)?;

    // Clothing always gets a size: the requested one, the product's first
    // listed size, or S.
    let size = if kind.is_sized() {
        let requested = payload
            .as_ref()
            .and_then(|p| p.size.as_deref())
            .and_then(|s| Size::from_str(s).ok());
        Some(requested.unwrap_or_else(|| {
            product
                .size_codes()
                .iter()
                .find_map(|code| Size::from_str(code).ok())
                .unwrap_or(Size::S)
        }))
    } else {
        None
    };

    let key = match size {
        Some(size) => CartKey::Sized {
            product_id: id,
            size: Some(size),
        },
        None => CartKey::Unsized { kind, item_id: id },
    };
    let item = SessionItem {
        name: product.title.clone(),
        price: pricing::unit_price(product.price, size),
        quantity: 1,
        image: product
            .image_url
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        size,
    };

    let mut cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    cart.add(&key, item.clone());
    cart.store(&session).await.map_err(map_service_error)?;

    // Write-through for logged-in customers; one unit per request, so the
    // persistent quantity tracks the session's increments.
    let customer_id = current_customer_id(&session)
        .await
        .map_err(map_service_error)?;
    if let Some(customer_id) = customer_id {
        if let Err(err) = state.services.carts.sync_item(customer_id, &key, &item).await {
            warn!(customer_id, key = %key, error = %err, "cart write-through failed");
        }
    }
    state
        .event_sender
        .send_or_log(Event::CartItemAdded {
            customer_id,
            key: key.to_string(),
        })
        .await;

    Ok(success_response(json!({
        "message": format!("'{}' added to your cart", product.title),
        "key": key.to_string(),
        "cart_count": cart.count(),
        "total_price": cart.total(),
    })))
}

/// Re-check one cart line against the catalog. The price is recomputed from
/// the current base price; a legacy bare-numeric key carries no size, so the
/// stored line's size is the fallback. Empty names and images are backfilled.
/// Returns true when the line was modified.
fn heal_line(key: &CartKey, item: &mut SessionItem, product: Option<&product::Model>) -> bool {
    let mut changed = false;
    match product {
        Some(product) => {
            let size = key.size().or(item.size);
            let fresh_price = pricing::unit_price(product.price, size);
            if item.price != fresh_price {
                item.price = fresh_price;
                changed = true;
            }
            if item.name.is_empty() {
                item.name = product.title.clone();
                changed = true;
            }
            if item.image.is_empty() {
                item.image = product
                    .image_url
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
                changed = true;
            }
        }
        None => {
            if item.name.is_empty() {
                item.name = "Unavailable product".to_string();
                changed = true;
            }
        }
    }
    changed
}

/// Render the cart, re-checking every line against the catalog via
/// [`heal_line`]. Fixes are written back to the session.
async fn cart_detail(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let customer_id = current_customer_id(&session)
        .await
        .map_err(map_service_error)?;

    let mut cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    // A fresh browser on an existing account starts from the persistent cart.
    if cart.is_empty() {
        if let Some(customer_id) = customer_id {
            match state.services.carts.load_session_cart(customer_id).await {
                Ok(persisted) if !persisted.is_empty() => {
                    cart = persisted;
                    cart.store(&session).await.map_err(map_service_error)?;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(customer_id, error = %err, "could not load persistent cart");
                }
            }
        }
    }

    let mut healed = SessionCart::default();
    let mut lines = Vec::new();
    let mut changed = false;
    for (key, raw, item) in cart.parsed_entries() {
        let mut item = item.clone();
        let product = state
            .services
            .catalog
            .find_item(key.kind(), key.item_id())
            .await
            .map_err(map_service_error)?;
        changed |= heal_line(&key, &mut item, product.as_ref());
        lines.push(CartLine {
            key: raw.to_string(),
            kind: key.kind(),
            item_id: key.item_id(),
            name: item.name.clone(),
            image: item.image.clone(),
            size: key
                .size()
                .or(item.size)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: pricing::round_to_cents(item.line_total()),
        });
        healed.insert_raw(raw.to_string(), item);
    }
    if changed || healed.len() != cart.len() {
        healed.store(&session).await.map_err(map_service_error)?;
    }

    Ok(success_response(json!({
        "items": lines,
        "cart_count": healed.count(),
        "total_price": pricing::round_to_cents(healed.total()),
    })))
}

/// One instruction of a bulk cart update: either an absolute quantity or an
/// increment/decrement step.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpdateInstruction {
    Quantity(u32),
    Step { op: StepOp },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StepOp {
    Inc,
    Dec,
}

async fn update_cart(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(updates): Json<BTreeMap<String, UpdateInstruction>>,
) -> Result<Response, ApiError> {
    let mut cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    let mut changes = Vec::new();

    for (raw, instruction) in &updates {
        let Some(current) = cart.get_raw(raw).cloned() else {
            continue;
        };
        let quantity = match instruction {
            UpdateInstruction::Quantity(q) => *q,
            UpdateInstruction::Step { op: StepOp::Inc } => current.quantity.saturating_add(1),
            UpdateInstruction::Step { op: StepOp::Dec } => current.quantity.saturating_sub(1),
        };
        cart.set_quantity(raw, quantity);
        if let Ok(key) = raw.parse::<CartKey>() {
            changes.push(QuantityChange {
                key,
                quantity,
                snapshot: Some(current),
            });
        }
    }
    cart.store(&session).await.map_err(map_service_error)?;

    if let Some(customer_id) = current_customer_id(&session)
        .await
        .map_err(map_service_error)?
    {
        if let Err(err) = state
            .services
            .carts
            .apply_quantity_changes(customer_id, &changes)
            .await
        {
            warn!(customer_id, error = %err, "cart write-through failed");
        }
    }

    Ok(success_response(json!({
        "cart_count": cart.count(),
        "total_price": pricing::round_to_cents(cart.total()),
    })))
}

async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_key): Path<String>,
) -> Result<Response, ApiError> {
    let mut cart = SessionCart::load(&session).await.map_err(map_service_error)?;
    let removed = cart.remove(&raw_key);
    cart.store(&session).await.map_err(map_service_error)?;

    if let Some(customer_id) = current_customer_id(&session)
        .await
        .map_err(map_service_error)?
    {
        if let Ok(key) = raw_key.parse::<CartKey>() {
            if let Err(err) = state.services.carts.remove_item(customer_id, &key).await {
                warn!(customer_id, key = %key, error = %err, "cart write-through failed");
            }
        }
    }

    Ok(success_response(json!({
        "removed": removed,
        "cart_count": cart.count(),
        "total_price": pricing::round_to_cents(cart.total()),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn dress(price: Decimal) -> product::Model {
        let now = Utc::now();
        product::Model {
            id: 12,
            kind: ProductKind::Clothing,
            category_id: Some(1),
            title: "Evening Dress".to_string(),
            slug: "evening-dress".to_string(),
            description: None,
            sizes: json!(["S", "M", "L"]),
            colors: json!(["Black"]),
            brand: Some("Zara".to_string()),
            collections: json!(["Trending"]),
            price,
            image_url: Some("/media/product/evening-dress.jpg".to_string()),
            hover_image_url: None,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(price: Decimal, size: Option<Size>) -> SessionItem {
        SessionItem {
            name: "Evening Dress".to_string(),
            price,
            quantity: 1,
            image: "/media/product/evening-dress.jpg".to_string(),
            size,
        }
    }

    #[test]
    fn heal_reprices_a_sized_key_from_the_current_base() {
        let key = CartKey::Sized {
            product_id: 12,
            size: Some(Size::L),
        };
        let mut item = line(dec!(110.00), Some(Size::L));
        let product = dress(dec!(120.00));
        assert!(heal_line(&key, &mut item, Some(&product)));
        assert_eq!(item.price, dec!(130.00));
    }

    #[test]
    fn heal_falls_back_to_the_stored_size_for_a_bare_key() {
        // Legacy carts hold bare-numeric keys with the size only on the line.
        let key: CartKey = "12".parse().unwrap();
        assert_eq!(key.size(), None);
        let mut item = line(dec!(1.00), Some(Size::M));
        let product = dress(dec!(100.00));
        assert!(heal_line(&key, &mut item, Some(&product)));
        assert_eq!(item.price, dec!(105.00));
    }

    #[test]
    fn heal_leaves_a_correct_line_untouched() {
        let key = CartKey::Sized {
            product_id: 12,
            size: Some(Size::M),
        };
        let mut item = line(dec!(105.00), Some(Size::M));
        let product = dress(dec!(100.00));
        assert!(!heal_line(&key, &mut item, Some(&product)));
    }

    #[test]
    fn heal_names_a_vanished_product() {
        let key = CartKey::Unsized {
            kind: ProductKind::Bag,
            item_id: 3,
        };
        let mut item = line(dec!(40.00), None);
        item.name.clear();
        assert!(heal_line(&key, &mut item, None));
        assert_eq!(item.name, "Unavailable product");
        assert_eq!(item.price, dec!(40.00));
    }
}
