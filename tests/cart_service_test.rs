//! Cart service unit tests.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use rust_decimal_macros::dec;

use farmfresh::domain::{CartItemView, CartLine, Product, QualityLevel};
use farmfresh::errors::AppError;
use farmfresh::infra::{
    MockCartRepository, MockOrderRepository, MockProductRepository, MockUserRepository,
};
use farmfresh::services::{CartManager, CartService};

use common::TestUnitOfWork;

fn test_product(product_id: &str, stock: i32) -> Product {
    Product {
        product_id: product_id.to_string(),
        name: "Heirloom Tomatoes".to_string(),
        category: "vegetables".to_string(),
        price: dec!(3.50),
        quality_score: 92,
        quality_level: QualityLevel::Excellent,
        description: String::new(),
        health_benefits: vec![],
        best_uses: vec![],
        image: String::new(),
        farmer: "Green Acres".to_string(),
        harvest_date: None,
        expiry_date: None,
        quality_assessment_date: None,
        stock,
        location: String::new(),
        certifications: vec![],
        inventory_metrics: serde_json::json!({}),
        created_at: Utc::now(),
        last_updated: Utc::now(),
    }
}

fn test_line(id: i32, user_id: i32, product_id: &str, quantity: i32) -> CartLine {
    CartLine {
        id,
        user_id,
        product_id: product_id.to_string(),
        quantity,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_item(quantity: i32, price: rust_decimal::Decimal) -> CartItemView {
    CartItemView {
        id: 1,
        user_id: 1,
        product_id: "tomato-1".to_string(),
        quantity,
        name: "Heirloom Tomatoes".to_string(),
        price,
        image: String::new(),
        category: "vegetables".to_string(),
        stock: 20,
        quality_score: 92,
        quality_level: QualityLevel::Excellent,
        subtotal: price * rust_decimal::Decimal::from(quantity),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn uow(products: MockProductRepository, carts: MockCartRepository) -> TestUnitOfWork {
    TestUnitOfWork::new(
        MockUserRepository::new(),
        products,
        carts,
        MockOrderRepository::new(),
    )
}

#[tokio::test]
async fn test_add_item_inserts_new_line() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_product_id()
        .with(eq("tomato-1"))
        .returning(|id| Ok(Some(test_product(id, 10))));

    let mut carts = MockCartRepository::new();
    carts.expect_find_line().returning(|_, _| Ok(None));
    carts
        .expect_insert_line()
        .with(eq(1), eq("tomato-1"), eq(2))
        .returning(|user_id, product_id, quantity| {
            Ok(test_line(1, user_id, product_id, quantity))
        });

    let service = CartManager::new(Arc::new(uow(products, carts)));
    let result = service.add_item(1, "tomato-1", 2).await.unwrap();

    assert_eq!(result.quantity, 2);
}

#[tokio::test]
async fn test_add_item_merges_existing_line() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_product_id()
        .returning(|id| Ok(Some(test_product(id, 10))));

    let mut carts = MockCartRepository::new();
    carts
        .expect_find_line()
        .returning(|user_id, product_id| Ok(Some(test_line(1, user_id, product_id, 3))));
    carts
        .expect_set_quantity()
        .with(eq(1), eq(5))
        .returning(|id, quantity| Ok(test_line(id, 1, "tomato-1", quantity)));

    let service = CartManager::new(Arc::new(uow(products, carts)));
    let result = service.add_item(1, "tomato-1", 2).await.unwrap();

    assert_eq!(result.quantity, 5);
}

#[tokio::test]
async fn test_add_item_rejects_merge_over_stock() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_product_id()
        .returning(|id| Ok(Some(test_product(id, 4))));

    let mut carts = MockCartRepository::new();
    carts
        .expect_find_line()
        .returning(|user_id, product_id| Ok(Some(test_line(1, user_id, product_id, 3))));

    let service = CartManager::new(Arc::new(uow(products, carts)));
    let result = service.add_item(1, "tomato-1", 2).await;

    assert!(matches!(result.unwrap_err(), AppError::InsufficientStock(_)));
}

#[tokio::test]
async fn test_add_item_rejects_out_of_stock_product() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_product_id()
        .returning(|id| Ok(Some(test_product(id, 0))));

    let service = CartManager::new(Arc::new(uow(products, MockCartRepository::new())));
    let result = service.add_item(1, "tomato-1", 1).await;

    assert!(matches!(result.unwrap_err(), AppError::OutOfStock));
}

#[tokio::test]
async fn test_add_item_rejects_zero_quantity() {
    let service = CartManager::new(Arc::new(uow(
        MockProductRepository::new(),
        MockCartRepository::new(),
    )));
    let result = service.add_item(1, "tomato-1", 0).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_add_item_unknown_product() {
    let mut products = MockProductRepository::new();
    products.expect_find_by_product_id().returning(|_| Ok(None));

    let service = CartManager::new(Arc::new(uow(products, MockCartRepository::new())));
    let result = service.add_item(1, "missing-1", 1).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_update_quantity_zero_removes_line() {
    let mut carts = MockCartRepository::new();
    carts
        .expect_find_by_id()
        .with(eq(1))
        .returning(|id| Ok(Some(test_line(id, 1, "tomato-1", 3))));
    carts.expect_delete_line().with(eq(1)).returning(|_| Ok(()));

    let service = CartManager::new(Arc::new(uow(MockProductRepository::new(), carts)));
    let result = service.update_quantity(1, 0).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_update_quantity_validates_against_stock() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_product_id()
        .returning(|id| Ok(Some(test_product(id, 3))));

    let mut carts = MockCartRepository::new();
    carts
        .expect_find_by_id()
        .returning(|id| Ok(Some(test_line(id, 1, "tomato-1", 2))));

    let service = CartManager::new(Arc::new(uow(products, carts)));
    let result = service.update_quantity(1, 5).await;

    assert!(matches!(result.unwrap_err(), AppError::InsufficientStock(_)));
}

#[tokio::test]
async fn test_get_cart_computes_totals() {
    let mut carts = MockCartRepository::new();
    carts.expect_items_for_user().returning(|_| {
        Ok(vec![test_item(2, dec!(3.50)), test_item(1, dec!(2.00))])
    });

    let service = CartManager::new(Arc::new(uow(MockProductRepository::new(), carts)));
    let cart = service.get_cart(1).await.unwrap();

    assert_eq!(cart.item_count, 3);
    assert_eq!(cart.total, dec!(9.00));
}

#[tokio::test]
async fn test_clear_cart_reports_removed_lines() {
    let mut carts = MockCartRepository::new();
    carts.expect_clear_user().with(eq(1)).returning(|_| Ok(4));

    let service = CartManager::new(Arc::new(uow(MockProductRepository::new(), carts)));
    let removed = service.clear_cart(1).await.unwrap();

    assert_eq!(removed, 4);
}
