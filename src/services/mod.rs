//! Domain services. Every operation returns `Result<_, ServiceError>` and
//! runs its multi-row writes inside a transaction.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod customers;
pub mod wishlist;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use contact::ContactService;
pub use customers::CustomerService;
pub use wishlist::WishlistService;
