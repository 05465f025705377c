//! Order service - checkout and order management.
//!
//! `create_order` is the one workflow that must commit or roll back as
//! a unit: header, line snapshots and stock adjustments all ride the
//! same transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::{DEFAULT_DELIVERY_METHOD, DEFAULT_PAYMENT_METHOD};
use crate::domain::{
    generate_order_id, normalize_delivery_date, NewOrder, NewOrderLine, Order, OrderStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// One incoming order line; values are frozen as-is into the snapshot
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Line subtotal; computed from price and quantity when absent
    pub subtotal: Option<Decimal>,
}

/// Checkout input, field formats already validated by the handler
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub user_id: i32,
    pub items: Vec<OrderItemInput>,
    pub subtotal: Decimal,
    pub delivery_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub delivery_method: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<serde_json::Value>,
    pub payment_info: Option<serde_json::Value>,
    pub special_instructions: Option<String>,
    /// Raw delivery date string; normalized, unparseable values are dropped
    pub estimated_delivery: Option<String>,
}

/// Order service trait for dependency injection
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order atomically: header, line snapshots and stock
    /// decrements commit together or not at all
    async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order>;

    /// Get an order with its lines by public order id
    async fn get_order(&self, order_id: &str) -> AppResult<Order>;

    /// A user's orders, newest first
    async fn get_orders_by_user(&self, user_id: i32) -> AppResult<Vec<Order>>;

    /// Overwrite the order status; the value must be a known status
    async fn update_status(&self, order_id: &str, status: &str) -> AppResult<Order>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    /// Create new order service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }
        for item in &input.items {
            if item.quantity < 1 {
                return Err(AppError::validation("Item quantity must be at least 1"));
            }
        }

        // The buyer must exist before anything is written
        self.uow
            .users()
            .find_by_id(input.user_id)
            .await?
            .ok_or_not_found()?;

        let order_id = generate_order_id();
        let estimated_delivery = input
            .estimated_delivery
            .as_deref()
            .and_then(normalize_delivery_date);

        let new_order = NewOrder {
            order_id,
            user_id: input.user_id,
            subtotal: input.subtotal,
            delivery_cost: input.delivery_cost,
            tax: input.tax,
            total: input.total,
            delivery_method: input
                .delivery_method
                .unwrap_or_else(|| DEFAULT_DELIVERY_METHOD.to_string()),
            payment_method: input
                .payment_method
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            shipping_address: input
                .shipping_address
                .unwrap_or_else(|| serde_json::json!({})),
            payment_info: input.payment_info.unwrap_or_else(|| serde_json::json!({})),
            special_instructions: input.special_instructions,
            estimated_delivery,
            items: input
                .items
                .into_iter()
                .map(|item| NewOrderLine {
                    subtotal: item
                        .subtotal
                        .unwrap_or_else(|| item.price * Decimal::from(item.quantity)),
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        };

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let header_id = ctx.orders().insert_header(&new_order).await?;

                    for line in &new_order.items {
                        ctx.orders().insert_line(header_id, line).await?;

                        // A vanished product does not sink the order; the
                        // snapshot stands and only the stock adjustment is
                        // skipped.
                        let adjusted = ctx
                            .products()
                            .decrement_stock(&line.product_id, line.quantity)
                            .await?;
                        if !adjusted {
                            tracing::warn!(
                                product_id = %line.product_id,
                                order_id = %new_order.order_id,
                                "Product missing during checkout, skipping stock adjustment"
                            );
                        }
                    }

                    ctx.orders()
                        .find_by_order_id(&new_order.order_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal("Order vanished before transaction read-back")
                        })
                })
            })
            .await
    }

    async fn get_order(&self, order_id: &str) -> AppResult<Order> {
        self.uow
            .orders()
            .find_by_order_id(order_id)
            .await?
            .ok_or_not_found()
    }

    async fn get_orders_by_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        self.uow.orders().list_by_user(user_id).await
    }

    async fn update_status(&self, order_id: &str, status: &str) -> AppResult<Order> {
        let status = OrderStatus::parse(status).ok_or_else(|| {
            AppError::validation(
                "Status must be one of: pending, processing, shipped, delivered, cancelled",
            )
        })?;
        self.uow.orders().update_status(order_id, status).await
    }
}
