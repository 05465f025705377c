//! API surface tests.
//!
//! Covers the response envelope, error-to-status mapping and the
//! domain helpers the handlers lean on, without requiring a database.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;

use farmfresh::domain::{
    generate_order_id, normalize_delivery_date, CartItemView, CartSummary, OrderStatus, Password,
    QualityLevel, UserRole,
};
use farmfresh::errors::AppError;
use farmfresh::types::ApiResponse;

// =============================================================================
// Response Envelope Tests
// =============================================================================

#[tokio::test]
async fn test_api_response_structure() {
    let response: ApiResponse<String> = ApiResponse::success("test data".to_string());
    assert!(response.success);
    assert_eq!(response.data.unwrap(), "test data");
    assert!(response.message.is_none());
}

#[tokio::test]
async fn test_api_response_with_message() {
    let response: ApiResponse<i32> = ApiResponse::with_message(42, "Operation completed");
    assert!(response.success);
    assert_eq!(response.data.unwrap(), 42);
    assert_eq!(response.message.unwrap(), "Operation completed");
}

#[tokio::test]
async fn test_message_only_response() {
    let response: ApiResponse<()> = ApiResponse::message("Success");
    assert!(response.success);
    assert!(response.data.is_none());
    assert_eq!(response.message.unwrap(), "Success");
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn test_app_error_status_codes() {
    assert_eq!(
        AppError::NotFound.into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::InvalidCredentials.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::AccountDeactivated.into_response().status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::validation("bad input").into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::conflict("A product with this name")
            .into_response()
            .status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::OutOfStock.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        AppError::insufficient_stock(3, 5).into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        AppError::internal("boom").into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_insufficient_stock_message_names_quantities() {
    let error = AppError::insufficient_stock(3, 5);
    let message = error.to_string();
    assert!(message.contains('3'));
    assert!(message.contains('5'));
}

// =============================================================================
// Domain Model Tests
// =============================================================================

#[tokio::test]
async fn test_user_role_display() {
    assert_eq!(UserRole::User.to_string(), "user");
    assert_eq!(UserRole::Admin.to_string(), "admin");
}

#[tokio::test]
async fn test_user_role_parse_rejects_unknown() {
    assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
    assert_eq!(UserRole::parse("superuser"), None);
    // The lenient From falls back to User
    assert_eq!(UserRole::from("superuser"), UserRole::User);
}

#[tokio::test]
async fn test_order_status_round_trip() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        assert_eq!(OrderStatus::parse(&status.to_string()), Some(status));
    }
    assert_eq!(OrderStatus::parse("teleported"), None);
}

#[tokio::test]
async fn test_quality_level_parse() {
    assert_eq!(QualityLevel::parse("excellent"), Some(QualityLevel::Excellent));
    assert_eq!(QualityLevel::parse("legendary"), None);
}

// =============================================================================
// Checkout Helper Tests
// =============================================================================

#[tokio::test]
async fn test_generate_order_id_format() {
    let id = generate_order_id();
    let parts: Vec<&str> = id.splitn(3, '-').collect();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "ORD");
    assert!(parts[1].parse::<i64>().is_ok());
    assert_eq!(parts[2].len(), 9);
}

#[tokio::test]
async fn test_generate_order_id_uniqueness() {
    assert_ne!(generate_order_id(), generate_order_id());
}

#[tokio::test]
async fn test_normalize_delivery_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2026, 1, 15);

    assert_eq!(normalize_delivery_date("2026-01-15"), expected);
    assert_eq!(
        normalize_delivery_date("2026-01-15T10:30:00+01:00"),
        expected
    );
    assert_eq!(
        normalize_delivery_date("Thursday, 15 January 2026"),
        expected
    );
}

#[tokio::test]
async fn test_normalize_delivery_date_drops_garbage() {
    assert_eq!(normalize_delivery_date("next tuesday-ish"), None);
    assert_eq!(normalize_delivery_date(""), None);
    assert_eq!(normalize_delivery_date("   "), None);
}

// =============================================================================
// Cart Summary Tests
// =============================================================================

fn cart_item(quantity: i32, price: rust_decimal::Decimal) -> CartItemView {
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

#[tokio::test]
async fn test_cart_summary_totals() {
    let summary = CartSummary::from_items(vec![
        cart_item(2, dec!(3.50)),
        cart_item(3, dec!(2.00)),
    ]);

    assert_eq!(summary.item_count, 5);
    assert_eq!(summary.total, dec!(13.00));
    assert_eq!(summary.items.len(), 2);
}

#[tokio::test]
async fn test_empty_cart_summary() {
    let summary = CartSummary::from_items(vec![]);

    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.total, dec!(0));
    assert!(summary.items.is_empty());
}

// =============================================================================
// Password Hashing Tests
// =============================================================================

#[tokio::test]
async fn test_password_hashing() {
    let plain = "Sup3rSecret";
    let password = Password::new(plain).expect("Hashing should succeed");
    let hash = password.into_string();

    assert_ne!(hash.as_str(), plain);

    let stored = Password::from_hash(hash);
    assert!(stored.verify(plain));
    assert!(!stored.verify("WrongPass1"));
}

#[tokio::test]
async fn test_password_hash_uniqueness() {
    let plain = "Sup3rSecret";
    let hash1 = Password::new(plain).expect("Hashing should succeed").into_string();
    let hash2 = Password::new(plain).expect("Hashing should succeed").into_string();

    // Same password, different salts
    assert_ne!(hash1, hash2);
    assert!(Password::from_hash(hash1).verify(plain));
    assert!(Password::from_hash(hash2).verify(plain));
}

#[tokio::test]
async fn test_password_strength_rule() {
    assert!(Password::meets_strength_rule("Sup3rSecret"));
    assert!(!Password::meets_strength_rule("short1A"));
    assert!(!Password::meets_strength_rule("nouppercase1"));
    assert!(!Password::meets_strength_rule("NOLOWERCASE1"));
    assert!(!Password::meets_strength_rule("NoDigitsHere"));
}

// Checkout's transactional path needs PostgreSQL and lives in
// tests/checkout_db_test.rs, behind #[ignore].
