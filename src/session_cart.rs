//! The anonymous (session) shopping cart and its legacy key encoding.
//!
//! Cart lines live in the cookie session as a string-keyed map. The key
//! format is historical and overloaded: `"<id>_<SIZE>"` for sized clothing,
//! `"<category>_<id>"` for everything else, and a bare numeric `"<id>"` for
//! old sized-goods entries with no recorded size. [`CartKey`] is the typed
//! form; the string shape survives only at this boundary.

use crate::entities::ProductKind;
use crate::errors::ServiceError;
use crate::pricing::Size;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tower_sessions::Session;
use tracing::warn;

/// Session key holding the cart map.
pub const CART_KEY: &str = "cart";
/// Session key holding the summed quantity counter shown in the header.
pub const CART_COUNT_KEY: &str = "cart_count";
/// Session key holding the authenticated customer id.
pub const CUSTOMER_ID_KEY: &str = "customer_id";
/// Session key holding the customer's display name.
pub const CUSTOMER_NAME_KEY: &str = "customer_name";

/// Typed cart key. Disambiguation of the wire form integer-parses the first
/// underscore-delimited segment: numeric means a sized clothing entry,
/// anything else is a category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CartKey {
    /// Clothing line: `"<id>_<SIZE>"`, or bare `"<id>"` when no size was
    /// recorded (legacy entries).
    Sized {
        product_id: i64,
        size: Option<Size>,
    },
    /// Any other product family: `"<category>_<id>"`.
    Unsized { kind: ProductKind, item_id: i64 },
}

impl CartKey {
    pub fn kind(&self) -> ProductKind {
        match self {
            CartKey::Sized { .. } => ProductKind::Clothing,
            CartKey::Unsized { kind, .. } => *kind,
        }
    }

    pub fn item_id(&self) -> i64 {
        match self {
            CartKey::Sized { product_id, .. } => *product_id,
            CartKey::Unsized { item_id, .. } => *item_id,
        }
    }

    pub fn size(&self) -> Option<Size> {
        match self {
            CartKey::Sized { size, .. } => *size,
            CartKey::Unsized { .. } => None,
        }
    }

    /// The `size` column value for persistent cart rows (`''` when none).
    pub fn size_column(&self) -> String {
        self.size().map(|s| s.to_string()).unwrap_or_default()
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartKey::Sized {
                product_id,
                size: Some(size),
            } => write!(f, "{product_id}_{size}"),
            CartKey::Sized {
                product_id,
                size: None,
            } => write!(f, "{product_id}"),
            CartKey::Unsized { kind, item_id } => write!(f, "{}_{item_id}", kind.as_tag()),
        }
    }
}

impl FromStr for CartKey {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            None => {
                let product_id = s.parse::<i64>().map_err(|_| {
                    ServiceError::InvalidInput(format!("malformed cart key: {s}"))
                })?;
                Ok(CartKey::Sized {
                    product_id,
                    size: None,
                })
            }
            Some((first, rest)) => {
                if let Ok(product_id) = first.parse::<i64>() {
                    // Size suffixes that are not valid sizes are dropped, not
                    // rejected; old sessions may carry arbitrary suffixes.
                    let size = Size::from_str(rest).ok();
                    Ok(CartKey::Sized { product_id, size })
                } else {
                    let kind = ProductKind::from_tag(first).ok_or_else(|| {
                        ServiceError::InvalidInput(format!("unknown cart key category: {first}"))
                    })?;
                    let item_id = rest.parse::<i64>().map_err(|_| {
                        ServiceError::InvalidInput(format!("malformed cart key: {s}"))
                    })?;
                    Ok(CartKey::Unsized { kind, item_id })
                }
            }
        }
    }
}

/// One line of the session cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl SessionItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The per-browser cart: composite key → line record. Kept sorted so
/// responses render in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCart {
    items: BTreeMap<String, SessionItem>,
}

impl SessionCart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across lines; this is the header badge value.
    pub fn count(&self) -> u32 {
        self.items.values().map(|item| item.quantity).sum()
    }

    pub fn total(&self) -> Decimal {
        self.items.values().map(SessionItem::line_total).sum()
    }

    pub fn get(&self, key: &CartKey) -> Option<&SessionItem> {
        self.items.get(&key.to_string())
    }

    pub fn get_raw(&self, key: &str) -> Option<&SessionItem> {
        self.items.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SessionItem)> {
        self.items.iter()
    }

    /// Lines with their parsed keys; unparseable keys are skipped with a
    /// warning rather than failing the whole cart.
    pub fn parsed_entries(&self) -> impl Iterator<Item = (CartKey, &str, &SessionItem)> {
        self.items
            .iter()
            .filter_map(|(raw, item)| match raw.parse::<CartKey>() {
                Ok(key) => Some((key, raw.as_str(), item)),
                Err(err) => {
                    warn!(key = %raw, error = %err, "skipping unparseable cart key");
                    None
                }
            })
    }

    /// Add a line, merging with any existing line under the same key: the
    /// quantities sum and the stored price takes the latest server-computed
    /// value.
    pub fn add(&mut self, key: &CartKey, item: SessionItem) {
        match self.items.get_mut(&key.to_string()) {
            Some(existing) => {
                existing.quantity += item.quantity;
                existing.price = item.price;
                if existing.name.is_empty() {
                    existing.name = item.name;
                }
                if existing.image.is_empty() {
                    existing.image = item.image;
                }
                if item.size.is_some() {
                    existing.size = item.size;
                }
            }
            None => {
                self.items.insert(key.to_string(), item);
            }
        }
    }

    /// Insert a line under an already-encoded key, replacing any existing one.
    pub fn insert_raw(&mut self, key: String, item: SessionItem) {
        self.items.insert(key, item);
    }

    /// Set a line's quantity; zero removes the line. Returns false when the
    /// key is absent.
    pub fn set_quantity(&mut self, key: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.items.remove(key).is_some();
        }
        match self.items.get_mut(key) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.items.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub async fn load(session: &Session) -> Result<Self, ServiceError> {
        Ok(session
            .get::<SessionCart>(CART_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Write the cart and its quantity counter back to the session.
    pub async fn store(&self, session: &Session) -> Result<(), ServiceError> {
        session.insert(CART_KEY, self).await?;
        session.insert(CART_COUNT_KEY, self.count()).await?;
        Ok(())
    }
}

pub async fn current_customer_id(session: &Session) -> Result<Option<i64>, ServiceError> {
    Ok(session.get::<i64>(CUSTOMER_ID_KEY).await?)
}

pub async fn sign_in(
    session: &Session,
    customer_id: i64,
    display_name: &str,
) -> Result<(), ServiceError> {
    session.insert(CUSTOMER_ID_KEY, customer_id).await?;
    session.insert(CUSTOMER_NAME_KEY, display_name).await?;
    Ok(())
}

/// Drop the whole session: cart, counter and identity.
pub async fn sign_out(session: &Session) -> Result<(), ServiceError> {
    session.flush().await?;
    Ok(())
}
