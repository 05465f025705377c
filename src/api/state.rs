//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AuthService, CartService, CatalogService, OrderService, ServiceContainer, Services,
    UserService,
};

/// Application state containing all services (DI container).
///
/// Use `from_config()` for recommended initialization with full
/// ServiceContainer and UnitOfWork support.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Catalog service
    pub catalog_service: Arc<dyn CatalogService>,
    /// Cart service
    pub cart_service: Arc<dyn CartService>,
    /// Order service
    pub order_service: Arc<dyn OrderService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it uses
    /// the ServiceContainer for centralized service management.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            catalog_service: container.catalog(),
            cart_service: container.carts(),
            order_service: container.orders(),
            database,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        catalog_service: Arc<dyn CatalogService>,
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            catalog_service,
            cart_service,
            order_service,
            database,
        }
    }
}
