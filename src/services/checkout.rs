//! Checkout: quote computation and order placement.

use crate::config::AppConfig;
use crate::entities::{cart, order, Cart, CartItem, Customer};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::pricing::{self, Size};
use crate::session_cart::SessionCart;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    shipping_flat_rate: Decimal,
}

/// One priced cart line of a quote; also the shape persisted into the
/// order's `line_items` JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutQuote {
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Buyer details submitted with the order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub company: String,
    pub address: String,
    #[serde(default)]
    pub apartment: String,
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region_state: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub order_notes: String,
}

/// A past order with its line items parsed back out of the JSON snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub created_at: chrono::DateTime<Utc>,
    pub total: Decimal,
    pub payment_method: String,
    pub lines: Vec<QuoteLine>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            db,
            event_sender,
            shipping_flat_rate: config.shipping_flat_rate,
        }
    }

    /// Price the session cart: per-line subtotals, cart subtotal, flat
    /// shipping and grand total, all rounded to cents.
    pub fn quote(&self, session_cart: &SessionCart) -> CheckoutQuote {
        let lines: Vec<QuoteLine> = session_cart
            .iter()
            .map(|(key, item)| {
                let unit_price = pricing::round_to_cents(item.price);
                QuoteLine {
                    key: key.clone(),
                    name: item.name.clone(),
                    size: item.size,
                    quantity: item.quantity,
                    unit_price,
                    subtotal: pricing::round_to_cents(
                        unit_price * Decimal::from(item.quantity),
                    ),
                }
            })
            .collect();
        let subtotal = pricing::round_to_cents(lines.iter().map(|l| l.subtotal).sum());
        let shipping = pricing::round_to_cents(self.shipping_flat_rate);
        CheckoutQuote {
            subtotal,
            shipping,
            total: pricing::round_to_cents(subtotal + shipping),
            lines,
        }
    }

    /// Place an order: insert the immutable order row and delete the
    /// customer's persistent cart in one transaction. The session cart is the
    /// caller's to clear once this returns.
    #[instrument(skip(self, input, session_cart))]
    pub async fn place_order(
        &self,
        customer_id: i64,
        input: PlaceOrderInput,
        session_cart: &SessionCart,
    ) -> Result<order::Model, ServiceError> {
        if session_cart.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Your cart is empty".to_string(),
            ));
        }
        for (value, field) in [
            (&input.first_name, "First name"),
            (&input.last_name, "Last name"),
            (&input.address, "Address"),
            (&input.city, "City"),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "{field} is required"
                )));
            }
        }

        let quote = self.quote(session_cart);
        let line_items = serde_json::to_value(&quote.lines)?;

        let txn = self.db.begin().await?;

        Customer::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {customer_id}")))?;

        let placed = order::ActiveModel {
            customer_id: Set(customer_id),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            telephone: Set(input.telephone),
            company: Set(input.company),
            address: Set(input.address.trim().to_string()),
            apartment: Set(input.apartment),
            city: Set(input.city.trim().to_string()),
            postcode: Set(input.postcode),
            country: Set(input.country),
            region_state: Set(input.region_state),
            order_notes: Set(input.order_notes),
            payment_method: Set(input.payment_method),
            line_items: Set(line_items),
            total: Set(quote.total),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // the persistent cart must not resurrect these lines on a later login
        if let Some(cart_row) = Cart::find()
            .filter(cart::Column::CustomerId.eq(customer_id))
            .one(&txn)
            .await?
        {
            CartItem::delete_many()
                .filter(crate::entities::cart_item::Column::CartId.eq(cart_row.id))
                .exec(&txn)
                .await?;
            cart_row.delete(&txn).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id: placed.id,
                customer_id,
                total: placed.total,
            })
            .await;
        info!(order_id = placed.id, customer_id, total = %placed.total, "order placed");
        Ok(placed)
    }

    /// The customer's orders, newest first, with line items parsed from the
    /// stored snapshot. Lines that no longer parse are dropped rather than
    /// failing the history page.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, customer_id: i64) -> Result<Vec<OrderSummary>, ServiceError> {
        let orders = crate::entities::Order::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(orders
            .into_iter()
            .map(|o| {
                let lines =
                    serde_json::from_value::<Vec<QuoteLine>>(o.line_items.clone()).unwrap_or_default();
                OrderSummary {
                    id: o.id,
                    created_at: o.created_at,
                    total: o.total,
                    payment_method: o.payment_method,
                    lines,
                }
            })
            .collect())
    }
}
