//! Persistent per-customer carts and their synchronization with the
//! session cart.

use crate::entities::{cart, cart_item, Cart, CartItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::pricing::Size;
use crate::session_cart::{CartKey, SessionCart, SessionItem};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// A quantity change to apply to the persistent cart. `quantity == 0`
/// deletes the line; `snapshot` supplies title/image/price when the line has
/// to be created rather than updated.
#[derive(Debug, Clone)]
pub struct QuantityChange {
    pub key: CartKey,
    pub quantity: u32,
    pub snapshot: Option<SessionItem>,
}

/// The `quantity` column is `i32`; session quantities above that clamp
/// instead of wrapping negative.
fn db_quantity(quantity: u32) -> i32 {
    quantity.min(i32::MAX as u32) as i32
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    async fn get_or_create_cart<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: i64,
    ) -> Result<cart::Model, ServiceError> {
        if let Some(existing) = Cart::find()
            .filter(cart::Column::CustomerId.eq(customer_id))
            .one(conn)
            .await?
        {
            return Ok(existing);
        }
        let now = Utc::now();
        let created = cart::ActiveModel {
            customer_id: Set(customer_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(created)
    }

    async fn find_line<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: i64,
        key: &CartKey,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        Ok(CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::Kind.eq(key.kind()))
            .filter(cart_item::Column::ProductId.eq(key.item_id()))
            .filter(cart_item::Column::Size.eq(key.size_column()))
            .one(conn)
            .await?)
    }

    /// Merge one session line into the persistent cart: quantities add,
    /// the unit price takes the session's latest server-computed value, and
    /// empty title/image snapshots are refreshed.
    async fn merge_line<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: i64,
        key: &CartKey,
        item: &SessionItem,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        match self.find_line(conn, cart_id, key).await? {
            Some(existing) => {
                let new_quantity = existing
                    .quantity
                    .max(0)
                    .saturating_add(db_quantity(item.quantity));
                let mut active: cart_item::ActiveModel = existing.into();
                active.quantity = Set(new_quantity);
                active.unit_price = Set(item.price);
                if !item.name.is_empty() {
                    active.product_title = Set(item.name.clone());
                }
                if !item.image.is_empty() {
                    active.image_url = Set(item.image.clone());
                }
                active.updated_at = Set(now);
                active.update(conn).await?;
            }
            None => {
                cart_item::ActiveModel {
                    cart_id: Set(cart_id),
                    kind: Set(key.kind()),
                    product_id: Set(key.item_id()),
                    product_title: Set(item.name.clone()),
                    image_url: Set(item.image.clone()),
                    size: Set(key.size_column()),
                    quantity: Set(db_quantity(item.quantity)),
                    unit_price: Set(item.price),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        Ok(())
    }

    /// Merge a single session line inside its own transaction (write-through
    /// for add-to-cart while logged in).
    #[instrument(skip(self, item), fields(key = %key))]
    pub async fn sync_item(
        &self,
        customer_id: i64,
        key: &CartKey,
        item: &SessionItem,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let cart = self.get_or_create_cart(&txn, customer_id).await?;
        self.merge_line(&txn, cart.id, key, item).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Login-time merge: every parseable session line is folded into the
    /// persistent cart in one transaction. Returns the number of merged lines.
    #[instrument(skip(self, session_cart))]
    pub async fn merge_session_cart(
        &self,
        customer_id: i64,
        session_cart: &SessionCart,
    ) -> Result<usize, ServiceError> {
        if session_cart.is_empty() {
            return Ok(0);
        }
        let txn = self.db.begin().await?;
        let cart = self.get_or_create_cart(&txn, customer_id).await?;
        let mut merged = 0usize;
        for (key, _raw, item) in session_cart.parsed_entries() {
            self.merge_line(&txn, cart.id, &key, item).await?;
            merged += 1;
        }
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartMerged {
                customer_id,
                merged_lines: merged,
            })
            .await;
        info!(customer_id, merged, "session cart merged");
        Ok(merged)
    }

    /// Snapshot the persistent cart in session form. This replaces the
    /// session cart after a login merge, so the database is the source of
    /// truth from that point on.
    #[instrument(skip(self))]
    pub async fn load_session_cart(&self, customer_id: i64) -> Result<SessionCart, ServiceError> {
        let mut session_cart = SessionCart::default();
        let Some(cart) = Cart::find()
            .filter(cart::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
        else {
            return Ok(session_cart);
        };

        let lines = cart.find_related(CartItem).all(&*self.db).await?;
        for line in lines {
            let size = Size::from_str(&line.size).ok();
            let key = if line.kind.is_sized() {
                CartKey::Sized {
                    product_id: line.product_id,
                    size,
                }
            } else {
                CartKey::Unsized {
                    kind: line.kind,
                    item_id: line.product_id,
                }
            };
            session_cart.insert_raw(
                key.to_string(),
                SessionItem {
                    name: line.product_title,
                    price: line.unit_price,
                    quantity: line.quantity.max(0) as u32,
                    image: line.image_url,
                    size,
                },
            );
        }
        Ok(session_cart)
    }

    /// Apply a batch of quantity changes in one transaction (set-semantics;
    /// zero deletes).
    #[instrument(skip(self, changes))]
    pub async fn apply_quantity_changes(
        &self,
        customer_id: i64,
        changes: &[QuantityChange],
    ) -> Result<(), ServiceError> {
        if changes.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await?;
        let cart = self.get_or_create_cart(&txn, customer_id).await?;
        for change in changes {
            match (
                self.find_line(&txn, cart.id, &change.key).await?,
                change.quantity,
            ) {
                (Some(existing), 0) => {
                    existing.delete(&txn).await?;
                }
                (Some(existing), quantity) => {
                    let mut active: cart_item::ActiveModel = existing.into();
                    active.quantity = Set(db_quantity(quantity));
                    active.updated_at = Set(Utc::now());
                    active.update(&txn).await?;
                }
                (None, 0) => {}
                (None, quantity) => {
                    if let Some(snapshot) = &change.snapshot {
                        let mut item = snapshot.clone();
                        item.quantity = quantity;
                        self.merge_line(&txn, cart.id, &change.key, &item).await?;
                    }
                }
            }
        }
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartUpdated { customer_id })
            .await;
        Ok(())
    }

    /// Remove one line from the persistent cart.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove_item(&self, customer_id: i64, key: &CartKey) -> Result<(), ServiceError> {
        let Some(cart) = Cart::find()
            .filter(cart::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
        else {
            return Ok(());
        };
        if let Some(line) = self.find_line(&*self.db, cart.id, key).await? {
            line.delete(&*self.db).await?;
            self.event_sender
                .send_or_log(Event::CartUpdated { customer_id })
                .await;
        }
        Ok(())
    }
}
