//! Shared test fixtures.
//!
//! Provides a `TestUnitOfWork` that wraps mocked repositories so service
//! tests run without a database connection.

use std::sync::Arc;

use async_trait::async_trait;

use farmfresh::errors::{AppError, AppResult};
use farmfresh::infra::{
    CartRepository, MockCartRepository, MockOrderRepository, MockProductRepository,
    MockUserRepository, OrderRepository, ProductRepository, TransactionContext, UnitOfWork,
    UserRepository,
};

/// Unit of Work over mocked repositories.
///
/// The transactional methods always fail: checkout paths that reach the
/// transaction boundary need a real database and are covered by ignored
/// integration tests instead.
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    products: Arc<MockProductRepository>,
    carts: Arc<MockCartRepository>,
    orders: Arc<MockOrderRepository>,
}

impl TestUnitOfWork {
    pub fn new(
        users: MockUserRepository,
        products: MockProductRepository,
        carts: MockCartRepository,
        orders: MockOrderRepository,
    ) -> Self {
        Self {
            users: Arc::new(users),
            products: Arc::new(products),
            carts: Arc::new(carts),
            orders: Arc::new(orders),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}
