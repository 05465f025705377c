//! Domain layer - Core business entities and logic
//!
//! Contains the business concepts of the storefront independent of
//! infrastructure concerns: accounts, products, cart lines, orders and
//! the password value object.

pub mod cart;
pub mod order;
pub mod password;
pub mod product;
pub mod user;

pub use cart::{CartItemView, CartLine, CartStatistics, CartSummary};
pub use order::{
    generate_order_id, normalize_delivery_date, NewOrder, NewOrderLine, Order, OrderLine,
    OrderStatus,
};
pub use password::Password;
pub use product::{
    clamp_quality_score, CatalogStatistics, NewProduct, Product, ProductPatch, QualityLevel,
};
pub use user::{
    Account, AccountResponse, AccountStatistics, NewAccount, ProfileChanges, UserRole,
};
