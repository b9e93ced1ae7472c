//! Per-customer wishlists with dedupe-on-insert.

use crate::entities::{product, wishlist_item, Product, ProductKind, WishlistItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::pricing;
use crate::services::catalog::PLACEHOLDER_IMAGE;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// A wishlist row ready for display: denormalized fields backfilled from the
/// catalog when the snapshot is missing or stale.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub id: i64,
    pub kind: ProductKind,
    pub product_id: i64,
    pub title: String,
    pub price: Decimal,
    pub price_display: String,
    pub image_url: String,
    pub hover_image_url: String,
    pub detail_url: String,
}

fn display_entry(row: wishlist_item::Model, catalog_row: Option<&product::Model>) -> WishlistEntry {
    let title = if row.title.is_empty() {
        catalog_row.map(|p| p.title.clone()).unwrap_or_default()
    } else {
        row.title
    };
    let price = if row.price.is_zero() {
        catalog_row.map(|p| p.price).unwrap_or(row.price)
    } else {
        row.price
    };
    let price = pricing::round_to_cents(price);
    let image_url = row
        .image_url
        .filter(|u| !u.is_empty())
        .or_else(|| catalog_row.and_then(|p| p.image_url.clone()))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
    let hover_image_url = row
        .hover_image_url
        .filter(|u| !u.is_empty())
        .or_else(|| catalog_row.and_then(|p| p.hover_image_url.clone()))
        .unwrap_or_else(|| image_url.clone());

    WishlistEntry {
        id: row.id,
        kind: row.kind,
        product_id: row.product_id,
        title,
        price,
        price_display: format!("{price:.2}"),
        image_url,
        hover_image_url,
        detail_url: format!("/products/{}", row.product_id),
    }
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Save a catalog item. Returns the row and whether it was created;
    /// saving an already-saved item is a no-op.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        customer_id: i64,
        kind: ProductKind,
        product_id: i64,
    ) -> Result<(wishlist_item::Model, bool), ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .filter(|p| p.kind == kind)
            .ok_or_else(|| ServiceError::NotFound(format!("{} {product_id}", kind.as_tag())))?;

        if let Some(existing) = WishlistItem::find()
            .filter(wishlist_item::Column::CustomerId.eq(customer_id))
            .filter(wishlist_item::Column::Kind.eq(kind))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?
        {
            return Ok((existing, false));
        }

        let created = wishlist_item::ActiveModel {
            customer_id: Set(customer_id),
            kind: Set(kind),
            product_id: Set(product_id),
            title: Set(product.title.clone()),
            price: Set(product.price),
            image_url: Set(product.image_url.clone()),
            hover_image_url: Set(product.hover_image_url.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::WishlistItemAdded {
                customer_id,
                product_id,
            })
            .await;
        info!(customer_id, product_id, kind = %kind, "wishlist item added");
        Ok((created, true))
    }

    /// The customer's saved items, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, customer_id: i64) -> Result<Vec<WishlistEntry>, ServiceError> {
        let rows = WishlistItem::find()
            .filter(wishlist_item::Column::CustomerId.eq(customer_id))
            .order_by_desc(wishlist_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let catalog_row = if row.title.is_empty()
                || row.price.is_zero()
                || row.image_url.as_deref().unwrap_or_default().is_empty()
            {
                Product::find_by_id(row.product_id)
                    .one(&*self.db)
                    .await?
                    .filter(|p| p.kind == row.kind)
            } else {
                None
            };
            entries.push(display_entry(row, catalog_row.as_ref()));
        }
        Ok(entries)
    }

    /// Delete a saved item, scoped to its owner. Someone else's row is
    /// indistinguishable from a missing one.
    #[instrument(skip(self))]
    pub async fn remove(&self, customer_id: i64, entry_id: i64) -> Result<(), ServiceError> {
        let row = WishlistItem::find_by_id(entry_id)
            .one(&*self.db)
            .await?
            .filter(|r| r.customer_id == customer_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Wishlist item {entry_id}")))?;

        row.delete(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::WishlistItemRemoved {
                customer_id,
                entry_id,
            })
            .await;
        Ok(())
    }
}
