//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and transaction lifecycle. Order
//! placement is the one workflow that spans aggregates (order header,
//! line snapshots, product stock) and must commit or roll back as a
//! unit; everything it touches inside the transaction goes through
//! `TransactionContext`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::entities::{order, order_item, product};
use super::repositories::{
    CartRepository, CartStore, OrderRepository, OrderStore, ProductRepository, ProductStore,
    UserRepository, UserStore,
};
use crate::domain::{NewOrder, NewOrderLine, Order, OrderStatus};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock the repositories it hands out instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get account repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get catalog repository
    fn products(&self) -> Arc<dyn ProductRepository>;

    /// Get cart repository
    fn carts(&self) -> Arc<dyn CartRepository>;

    /// Get order repository
    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back on error.
    /// Uses ReadCommitted isolation level by default for balanced consistency/performance.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable isolation.
    ///
    /// Use this for operations requiring the strongest consistency guarantees.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction. The context borrows the transaction
/// to ensure proper lifetime management.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get order repository for this transaction
    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository::new(self.txn)
    }

    /// Get product repository for this transaction
    pub fn products(&self) -> TxProductRepository<'_> {
        TxProductRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    product_repo: Arc<ProductStore>,
    cart_repo: Arc<CartStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let product_repo = Arc::new(ProductStore::new(db.clone()));
        let cart_repo = Arc::new(CartStore::new(db.clone()));
        let order_repo = Arc::new(OrderStore::new(db.clone()));
        Self {
            db,
            user_repo,
            product_repo,
            cart_repo,
            order_repo,
        }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

/// Transaction-aware order repository.
///
/// Executes all operations within the provided transaction.
/// Uses borrowed reference to ensure transaction outlives repository operations.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Insert the order header; status is always written as pending
    pub async fn insert_header(&self, new: &NewOrder) -> AppResult<i32> {
        let now = Utc::now();
        let active_model = order::ActiveModel {
            order_id: Set(new.order_id.clone()),
            user_id: Set(new.user_id),
            status: Set(OrderStatus::Pending.to_string()),
            subtotal: Set(new.subtotal),
            delivery_cost: Set(new.delivery_cost),
            tax: Set(new.tax),
            total: Set(new.total),
            delivery_method: Set(new.delivery_method.clone()),
            payment_method: Set(new.payment_method.clone()),
            shipping_address: Set(Some(new.shipping_address.clone())),
            payment_info: Set(Some(new.payment_info.clone())),
            special_instructions: Set(new.special_instructions.clone()),
            estimated_delivery: Set(new.estimated_delivery),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(self.txn).await?;
        Ok(model.id)
    }

    /// Insert one frozen line snapshot under an order header
    pub async fn insert_line(&self, header_id: i32, line: &NewOrderLine) -> AppResult<()> {
        let active_model = order_item::ActiveModel {
            order_id: Set(header_id),
            product_id: Set(line.product_id.clone()),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
            subtotal: Set(line.subtotal),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active_model.insert(self.txn).await?;
        Ok(())
    }

    /// Read an order with its lines back inside the transaction
    pub async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<Order>> {
        let header = order::Entity::find()
            .filter(order::Column::OrderId.eq(order_id))
            .one(self.txn)
            .await?;

        match header {
            Some(header) => {
                let lines = order_item::Entity::find()
                    .filter(order_item::Column::OrderId.eq(header.id))
                    .order_by_asc(order_item::Column::Id)
                    .all(self.txn)
                    .await?;
                Ok(Some(header.into_order(lines)))
            }
            None => Ok(None),
        }
    }
}

/// Transaction-aware product repository, used for stock adjustment
/// during order placement.
pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProductRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Decrement a product's stock, floored at zero.
    ///
    /// Returns false when the product does not exist; the caller decides
    /// whether that aborts the surrounding workflow.
    pub async fn decrement_stock(&self, product_id: &str, quantity: i32) -> AppResult<bool> {
        let found = product::Entity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(self.txn)
            .await?;

        let Some(model) = found else {
            return Ok(false);
        };

        let remaining = (model.stock - quantity).max(0);
        let mut active: product::ActiveModel = model.into();
        active.stock = Set(remaining);
        active.last_updated = Set(Utc::now());
        active.update(self.txn).await?;

        Ok(true)
    }
}
