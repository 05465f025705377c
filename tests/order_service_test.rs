//! Order service unit tests.
//!
//! The happy-path checkout rides a real database transaction and is not
//! exercised here; these tests cover the validation and lookup paths
//! that run before the transaction boundary.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use rust_decimal_macros::dec;

use farmfresh::domain::{Account, Order, OrderStatus, UserRole};
use farmfresh::errors::AppError;
use farmfresh::infra::{
    MockCartRepository, MockOrderRepository, MockProductRepository, MockUserRepository,
};
use farmfresh::services::{CreateOrderInput, OrderItemInput, OrderManager, OrderService};

use common::TestUnitOfWork;

fn test_account(id: i32) -> Account {
    Account {
        id,
        first_name: "Test".to_string(),
        last_name: "Shopper".to_string(),
        email: "test@example.com".to_string(),
        phone: "0612345678".to_string(),
        password_hash: "hashed".to_string(),
        postcode: "1234AB".to_string(),
        address: "Marketstraat 1".to_string(),
        city: "Utrecht".to_string(),
        role: UserRole::User,
        terms_accepted: true,
        newsletter: false,
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
    }
}

fn test_order(order_id: &str, user_id: i32) -> Order {
    Order {
        order_id: order_id.to_string(),
        user_id,
        status: OrderStatus::Pending,
        subtotal: dec!(7.00),
        delivery_cost: dec!(2.50),
        tax: dec!(0.60),
        total: dec!(10.10),
        delivery_method: "pickup".to_string(),
        payment_method: "card".to_string(),
        shipping_address: serde_json::json!({}),
        payment_info: serde_json::json!({}),
        special_instructions: None,
        estimated_delivery: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        items: vec![],
    }
}

fn checkout_input(user_id: i32, items: Vec<OrderItemInput>) -> CreateOrderInput {
    CreateOrderInput {
        user_id,
        items,
        subtotal: dec!(7.00),
        delivery_cost: dec!(2.50),
        tax: dec!(0.60),
        total: dec!(10.10),
        delivery_method: None,
        payment_method: None,
        shipping_address: None,
        payment_info: None,
        special_instructions: None,
        estimated_delivery: None,
    }
}

fn test_item(quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id: "tomato-1".to_string(),
        product_name: "Heirloom Tomatoes".to_string(),
        quantity,
        price: dec!(3.50),
        subtotal: None,
    }
}

fn uow(users: MockUserRepository, orders: MockOrderRepository) -> TestUnitOfWork {
    TestUnitOfWork::new(
        users,
        MockProductRepository::new(),
        MockCartRepository::new(),
        orders,
    )
}

#[tokio::test]
async fn test_create_order_rejects_empty_items() {
    let service = OrderManager::new(Arc::new(uow(
        MockUserRepository::new(),
        MockOrderRepository::new(),
    )));
    let result = service.create_order(checkout_input(1, vec![])).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_order_rejects_zero_quantity_item() {
    let service = OrderManager::new(Arc::new(uow(
        MockUserRepository::new(),
        MockOrderRepository::new(),
    )));
    let result = service
        .create_order(checkout_input(1, vec![test_item(0)]))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_order_rejects_unknown_buyer() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().with(eq(99)).returning(|_| Ok(None));

    let service = OrderManager::new(Arc::new(uow(users, MockOrderRepository::new())));
    let result = service
        .create_order(checkout_input(99, vec![test_item(2)]))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_get_order_success() {
    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_order_id()
        .with(eq("ORD-1700000000000-abc123def"))
        .returning(|order_id| Ok(Some(test_order(order_id, 1))));

    let service = OrderManager::new(Arc::new(uow(MockUserRepository::new(), orders)));
    let result = service.get_order("ORD-1700000000000-abc123def").await;

    assert_eq!(result.unwrap().user_id, 1);
}

#[tokio::test]
async fn test_get_order_not_found() {
    let mut orders = MockOrderRepository::new();
    orders.expect_find_by_order_id().returning(|_| Ok(None));

    let service = OrderManager::new(Arc::new(uow(MockUserRepository::new(), orders)));
    let result = service.get_order("ORD-missing").await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_get_orders_by_user() {
    let mut orders = MockOrderRepository::new();
    orders.expect_list_by_user().with(eq(1)).returning(|user_id| {
        Ok(vec![
            test_order("ORD-2", user_id),
            test_order("ORD-1", user_id),
        ])
    });

    let service = OrderManager::new(Arc::new(uow(MockUserRepository::new(), orders)));
    let result = service.get_orders_by_user(1).await.unwrap();

    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_update_status_success() {
    let mut orders = MockOrderRepository::new();
    orders
        .expect_update_status()
        .with(eq("ORD-1"), eq(OrderStatus::Shipped))
        .returning(|order_id, status| {
            let mut order = test_order(order_id, 1);
            order.status = status;
            Ok(order)
        });

    let service = OrderManager::new(Arc::new(uow(MockUserRepository::new(), orders)));
    let result = service.update_status("ORD-1", "shipped").await;

    assert_eq!(result.unwrap().status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_update_status_rejects_unknown_status() {
    let service = OrderManager::new(Arc::new(uow(
        MockUserRepository::new(),
        MockOrderRepository::new(),
    )));
    let result = service.update_status("ORD-1", "teleported").await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}
