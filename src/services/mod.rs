//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
mod cart_service;
mod catalog_service;
pub mod container;
mod order_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, Authenticator, Claims, LoginResponse, RegisterInput, TokenResponse,
};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{
    CatalogManager, CatalogService, CreateProductInput, UpdateProductInput,
};
pub use order_service::{CreateOrderInput, OrderItemInput, OrderManager, OrderService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
