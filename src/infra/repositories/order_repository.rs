//! Order repository - reads and status updates for placed orders.
//!
//! Order creation runs inside the unit of work transaction; see
//! `infra::unit_of_work`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use crate::domain::{Order, OrderStatus};
use crate::errors::{AppError, AppResult};

/// Order repository trait for dependency injection
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find an order with its line snapshots by public order id
    async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<Order>>;

    /// A user's orders with lines, newest first
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Order>>;

    /// Overwrite the order status
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> AppResult<Order>;
}

/// SeaORM-backed order repository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn lines_for(&self, header_id: i32) -> AppResult<Vec<order_item::Model>> {
        let lines = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(header_id))
            .order_by_asc(order_item::Column::Id)
            .all(&self.db)
            .await?;
        Ok(lines)
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<Order>> {
        let header = OrderEntity::find()
            .filter(order::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await?;

        match header {
            Some(header) => {
                let lines = self.lines_for(header.id).await?;
                Ok(Some(header.into_order(lines)))
            }
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        let headers = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            let lines = self.lines_for(header.id).await?;
            orders.push(header.into_order(lines));
        }
        Ok(orders)
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> AppResult<Order> {
        let header = OrderEntity::find()
            .filter(order::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let header_id = header.id;
        let mut active: order::ActiveModel = header.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        let lines = self.lines_for(header_id).await?;
        Ok(updated.into_order(lines))
    }
}
