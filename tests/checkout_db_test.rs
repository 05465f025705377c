//! Checkout transaction tests against a live PostgreSQL instance.
//!
//! Order placement commits a header, line snapshots and stock
//! decrements in a single transaction; mocked repositories cannot
//! exercise that path, so these tests talk to a real database and are
//! ignored by default. To run them:
//! 1. Start PostgreSQL (docker-compose up -d)
//! 2. Set DATABASE_URL if it differs from the default
//! 3. Run: cargo test -- --ignored

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use farmfresh::domain::{
    Account, NewAccount, NewProduct, OrderStatus, Password, Product, ProductPatch, QualityLevel,
    UserRole,
};
use farmfresh::infra::{Database, Persistence, UnitOfWork};
use farmfresh::services::{CreateOrderInput, OrderItemInput, OrderManager, OrderService};
use farmfresh::Config;

async fn persistence() -> Arc<Persistence> {
    let config = Config::from_env();
    let db = Database::connect_without_migrations(&config)
        .await
        .expect("PostgreSQL must be reachable; see docker-compose.yml");
    db.run_migrations().await.expect("migrations failed");
    Arc::new(Persistence::new(db.get_connection()))
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn seed_account(uow: &Persistence) -> Account {
    uow.users()
        .create(NewAccount {
            first_name: "Checkout".to_string(),
            last_name: "Tester".to_string(),
            email: format!("{}@example.com", unique("checkout")),
            phone: "0612345678".to_string(),
            password_hash: Password::new("Sup3rSecret").unwrap().into_string(),
            postcode: "1234AB".to_string(),
            address: "Marketstraat 1".to_string(),
            city: "Utrecht".to_string(),
            role: UserRole::User,
            terms_accepted: true,
            newsletter: false,
        })
        .await
        .unwrap()
}

async fn seed_product(uow: &Persistence, stock: i32, price: Decimal) -> Product {
    uow.products()
        .create(NewProduct {
            product_id: unique("product"),
            name: unique("Fresh Apples"),
            category: "fruit".to_string(),
            price,
            quality_score: 80,
            quality_level: QualityLevel::Good,
            description: None,
            health_benefits: vec![],
            best_uses: vec![],
            image: None,
            farmer: None,
            harvest_date: None,
            expiry_date: None,
            quality_assessment_date: None,
            stock,
            location: None,
            certifications: vec![],
            inventory_metrics: serde_json::json!({}),
        })
        .await
        .unwrap()
}

fn order_input(user_id: i32, items: Vec<OrderItemInput>) -> CreateOrderInput {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();
    CreateOrderInput {
        user_id,
        items,
        subtotal,
        delivery_cost: dec!(2.50),
        tax: dec!(0.60),
        total: subtotal + dec!(3.10),
        delivery_method: None,
        payment_method: None,
        shipping_address: None,
        payment_info: None,
        special_instructions: None,
        estimated_delivery: None,
    }
}

fn line_item(product: &Product, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id: product.product_id.clone(),
        product_name: product.name.clone(),
        quantity,
        price: product.price,
        subtotal: None,
    }
}

async fn cleanup(uow: &Persistence, account: &Account, products: &[&Product]) {
    // Hard delete; the account's orders cascade away with it.
    uow.users().delete(account.id).await.unwrap();
    for product in products {
        uow.products().delete(&product.product_id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_checkout_commits_header_lines_and_stock_together() {
    let uow = persistence().await;
    let account = seed_account(&uow).await;
    let product = seed_product(&uow, 10, dec!(3.00)).await;

    let service = OrderManager::new(uow.clone());
    let order = service
        .create_order(order_input(account.id, vec![line_item(&product, 4)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 4);
    assert_eq!(order.items[0].subtotal, dec!(12.00));

    let restocked = uow
        .products()
        .find_by_product_id(&product.product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restocked.stock, 6);

    cleanup(&uow, &account, &[&product]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_failed_checkout_leaves_no_partial_writes() {
    let uow = persistence().await;
    let account = seed_account(&uow).await;
    let product = seed_product(&uow, 10, dec!(3.00)).await;

    // The second line's subtotal exceeds NUMERIC(10,2), so its insert
    // fails after the header, the first line and the first stock
    // decrement have already been written.
    let mut oversized = line_item(&product, 1);
    oversized.subtotal = Some(dec!(999999999.99));

    let service = OrderManager::new(uow.clone());
    let result = service
        .create_order(order_input(
            account.id,
            vec![line_item(&product, 2), oversized],
        ))
        .await;
    assert!(result.is_err());

    let orders = uow.orders().list_by_user(account.id).await.unwrap();
    assert!(orders.is_empty());

    let untouched = uow
        .products()
        .find_by_product_id(&product.product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.stock, 10);

    cleanup(&uow, &account, &[&product]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_checkout_floors_stock_at_zero() {
    let uow = persistence().await;
    let account = seed_account(&uow).await;
    let product = seed_product(&uow, 3, dec!(1.25)).await;

    let service = OrderManager::new(uow.clone());
    let order = service
        .create_order(order_input(account.id, vec![line_item(&product, 10)]))
        .await
        .unwrap();
    assert_eq!(order.items[0].quantity, 10);

    let drained = uow
        .products()
        .find_by_product_id(&product.product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(drained.stock, 0);

    cleanup(&uow, &account, &[&product]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_order_lines_keep_snapshot_price_after_catalog_edit() {
    let uow = persistence().await;
    let account = seed_account(&uow).await;
    let product = seed_product(&uow, 10, dec!(2.50)).await;

    let service = OrderManager::new(uow.clone());
    let order = service
        .create_order(order_input(account.id, vec![line_item(&product, 2)]))
        .await
        .unwrap();
    assert_eq!(order.items[0].price, dec!(2.50));

    uow.products()
        .update(
            &product.product_id,
            ProductPatch {
                price: Some(dec!(4.00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reread = service.get_order(&order.order_id).await.unwrap();
    assert_eq!(reread.items[0].price, dec!(2.50));
    assert_eq!(reread.items[0].subtotal, dec!(5.00));

    cleanup(&uow, &account, &[&product]).await;
}
