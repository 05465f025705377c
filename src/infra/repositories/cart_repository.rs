//! Cart repository - persistence for the `cart` table.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::product::{self, Entity as ProductEntity};
use crate::domain::{CartItemView, CartLine, QualityLevel};
use crate::errors::{AppError, AppResult};

/// Cart repository trait for dependency injection
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find a cart line by primary key
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CartLine>>;

    /// Find the line a user holds for a product, if any
    async fn find_line(&self, user_id: i32, product_id: &str) -> AppResult<Option<CartLine>>;

    /// Insert a new line
    async fn insert_line(&self, user_id: i32, product_id: &str, quantity: i32)
        -> AppResult<CartLine>;

    /// Replace a line's quantity
    async fn set_quantity(&self, id: i32, quantity: i32) -> AppResult<CartLine>;

    /// Remove a single line
    async fn delete_line(&self, id: i32) -> AppResult<()>;

    /// Remove every line a user holds, returning how many were removed
    async fn clear_user(&self, user_id: i32) -> AppResult<u64>;

    /// A user's lines joined with the live products, oldest first
    async fn items_for_user(&self, user_id: i32) -> AppResult<Vec<CartItemView>>;
}

/// SeaORM-backed cart repository
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn view(line: cart_item::Model, product: product::Model) -> CartItemView {
    let subtotal = product.price * Decimal::from(line.quantity);
    CartItemView {
        id: line.id,
        user_id: line.user_id,
        product_id: line.product_id,
        quantity: line.quantity,
        name: product.name,
        price: product.price,
        image: product.image.unwrap_or_default(),
        category: product.category,
        stock: product.stock,
        quality_score: product.quality_score,
        quality_level: QualityLevel::from(product.quality_level.as_str()),
        subtotal,
        created_at: line.created_at,
        updated_at: line.updated_at,
    }
}

#[async_trait]
impl CartRepository for CartStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CartLine>> {
        let result = CartItemEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(CartLine::from))
    }

    async fn find_line(&self, user_id: i32, product_id: &str) -> AppResult<Option<CartLine>> {
        let result = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;
        Ok(result.map(CartLine::from))
    }

    async fn insert_line(
        &self,
        user_id: i32,
        product_id: &str,
        quantity: i32,
    ) -> AppResult<CartLine> {
        let now = Utc::now();
        let active_model = cart_item::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id.to_string()),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = active_model.insert(&self.db).await?;
        Ok(CartLine::from(model))
    }

    async fn set_quantity(&self, id: i32, quantity: i32) -> AppResult<CartLine> {
        let line = CartItemEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: cart_item::ActiveModel = line.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(CartLine::from(model))
    }

    async fn delete_line(&self, id: i32) -> AppResult<()> {
        let result = CartItemEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn clear_user(&self, user_id: i32) -> AppResult<u64> {
        let result = CartItemEntity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn items_for_user(&self, user_id: i32) -> AppResult<Vec<CartItemView>> {
        let rows = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(ProductEntity)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (line, product) in rows {
            match product {
                Some(product) => items.push(view(line, product)),
                // FK cascade makes this unreachable in practice
                None => tracing::warn!(
                    product_id = %line.product_id,
                    "Cart line references a missing product, skipping"
                ),
            }
        }
        Ok(items)
    }
}
