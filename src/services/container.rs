//! Service Container - Centralized service access.
//!
//! Provides centralized access to all application services behind
//! trait objects, so handlers depend on abstractions rather than
//! concrete implementations.

use std::sync::Arc;

use super::{AuthService, CartService, CatalogService, OrderService, UserService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get catalog service
    fn catalog(&self) -> Arc<dyn CatalogService>;

    /// Get cart service
    fn carts(&self) -> Arc<dyn CartService>;

    /// Get order service
    fn orders(&self) -> Arc<dyn OrderService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    catalog_service: Arc<dyn CatalogService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        catalog_service: Arc<dyn CatalogService>,
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            catalog_service,
            cart_service,
            order_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, CartManager, CatalogManager, OrderManager, UserManager};

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let user_service = Arc::new(UserManager::new(uow.clone()));
        let catalog_service = Arc::new(CatalogManager::new(uow.clone()));
        let cart_service = Arc::new(CartManager::new(uow.clone()));
        let order_service = Arc::new(OrderManager::new(uow));

        Self {
            auth_service,
            user_service,
            catalog_service,
            cart_service,
            order_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }
}
