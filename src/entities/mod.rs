//! sea-orm entity models for the storefront schema.

pub mod cart;
pub mod cart_item;
pub mod category;
pub mod contact_message;
pub mod customer;
pub mod order;
pub mod product;
pub mod wishlist_item;

pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use category::Entity as Category;
pub use contact_message::Entity as ContactMessage;
pub use customer::Entity as Customer;
pub use order::Entity as Order;
pub use product::{Entity as Product, ProductKind};
pub use wishlist_item::Entity as WishlistItem;
