//! Cart service - shopping cart business logic.
//!
//! Quantities are always validated against live stock; a repeat add
//! for the same product merges into the existing line.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CartLine, CartStatistics, CartSummary};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Cart service trait for dependency injection
#[async_trait]
pub trait CartService: Send + Sync {
    /// Add a product to a user's cart, merging with any existing line
    async fn add_item(&self, user_id: i32, product_id: &str, quantity: i32)
        -> AppResult<CartLine>;

    /// Replace a line's quantity; zero or less removes the line and
    /// returns `None`
    async fn update_quantity(&self, line_id: i32, quantity: i32) -> AppResult<Option<CartLine>>;

    /// Remove a single line
    async fn remove_item(&self, line_id: i32) -> AppResult<()>;

    /// Empty a user's cart, returning how many lines were removed
    async fn clear_cart(&self, user_id: i32) -> AppResult<u64>;

    /// A user's cart joined with live product data, with totals
    async fn get_cart(&self, user_id: i32) -> AppResult<CartSummary>;

    /// Sum of quantities across a user's lines
    async fn item_count(&self, user_id: i32) -> AppResult<i64>;

    /// Per-user cart statistics
    async fn statistics(&self, user_id: i32) -> AppResult<CartStatistics>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    /// Create new cart service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn add_item(
        &self,
        user_id: i32,
        product_id: &str,
        quantity: i32,
    ) -> AppResult<CartLine> {
        if quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }

        let product = self
            .uow
            .products()
            .find_by_product_id(product_id)
            .await?
            .ok_or_not_found()?;

        if product.stock == 0 {
            return Err(AppError::OutOfStock);
        }

        match self.uow.carts().find_line(user_id, product_id).await? {
            Some(existing) => {
                // Merge by adding quantities and re-validate against stock
                let merged = existing.quantity + quantity;
                if merged > product.stock {
                    return Err(AppError::insufficient_stock(product.stock, merged));
                }
                self.uow.carts().set_quantity(existing.id, merged).await
            }
            None => {
                if quantity > product.stock {
                    return Err(AppError::insufficient_stock(product.stock, quantity));
                }
                self.uow
                    .carts()
                    .insert_line(user_id, product_id, quantity)
                    .await
            }
        }
    }

    async fn update_quantity(&self, line_id: i32, quantity: i32) -> AppResult<Option<CartLine>> {
        let line = self
            .uow
            .carts()
            .find_by_id(line_id)
            .await?
            .ok_or_not_found()?;

        // Zero or negative quantity means removal
        if quantity <= 0 {
            self.uow.carts().delete_line(line.id).await?;
            return Ok(None);
        }

        let product = self
            .uow
            .products()
            .find_by_product_id(&line.product_id)
            .await?
            .ok_or_not_found()?;

        if quantity > product.stock {
            return Err(AppError::insufficient_stock(product.stock, quantity));
        }

        let updated = self.uow.carts().set_quantity(line.id, quantity).await?;
        Ok(Some(updated))
    }

    async fn remove_item(&self, line_id: i32) -> AppResult<()> {
        self.uow.carts().delete_line(line_id).await
    }

    async fn clear_cart(&self, user_id: i32) -> AppResult<u64> {
        self.uow.carts().clear_user(user_id).await
    }

    async fn get_cart(&self, user_id: i32) -> AppResult<CartSummary> {
        let items = self.uow.carts().items_for_user(user_id).await?;
        Ok(CartSummary::from_items(items))
    }

    async fn item_count(&self, user_id: i32) -> AppResult<i64> {
        let cart = self.get_cart(user_id).await?;
        Ok(cart.item_count)
    }

    async fn statistics(&self, user_id: i32) -> AppResult<CartStatistics> {
        let cart = self.get_cart(user_id).await?;
        Ok(CartStatistics::from(&cart))
    }
}
