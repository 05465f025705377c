//! Authentication service unit tests.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;

use farmfresh::config::Config;
use farmfresh::domain::{Account, Password, UserRole};
use farmfresh::errors::AppError;
use farmfresh::infra::{
    MockCartRepository, MockOrderRepository, MockProductRepository, MockUserRepository,
};
use farmfresh::services::{AuthService, Authenticator, RegisterInput};

use common::TestUnitOfWork;

fn test_account(id: i32, password_hash: &str) -> Account {
    Account {
        id,
        first_name: "Test".to_string(),
        last_name: "Shopper".to_string(),
        email: "test@example.com".to_string(),
        phone: "0612345678".to_string(),
        password_hash: password_hash.to_string(),
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

fn register_input() -> RegisterInput {
    RegisterInput {
        first_name: "Test".to_string(),
        last_name: "Shopper".to_string(),
        email: "Test@Example.com".to_string(),
        phone: "0612345678".to_string(),
        password: "Sup3rSecret".to_string(),
        confirm_password: "Sup3rSecret".to_string(),
        postcode: "1234AB".to_string(),
        address: "Marketstraat 1".to_string(),
        city: "Utrecht".to_string(),
        terms_accepted: true,
        newsletter: false,
    }
}

fn service(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
    let uow = TestUnitOfWork::new(
        users,
        MockProductRepository::new(),
        MockCartRepository::new(),
        MockOrderRepository::new(),
    );
    Authenticator::new(Arc::new(uow), Config::for_tests())
}

#[tokio::test]
async fn test_register_lowercases_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq("test@example.com"))
        .returning(|_| Ok(None));
    users.expect_create().returning(|new| {
        let mut account = test_account(1, &new.password_hash);
        account.email = new.email;
        account.role = new.role;
        Ok(account)
    });

    let result = service(users).register(register_input()).await.unwrap();

    assert_eq!(result.email, "test@example.com");
    assert_eq!(result.role, UserRole::User);
}

#[tokio::test]
async fn test_register_rejects_password_mismatch() {
    let mut input = register_input();
    input.confirm_password = "Different1".to_string();

    let result = service(MockUserRepository::new()).register(input).await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("do not match")));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let mut input = register_input();
    input.password = "weak".to_string();
    input.confirm_password = "weak".to_string();

    let result = service(MockUserRepository::new()).register(input).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_register_requires_terms_acceptance() {
    let mut input = register_input();
    input.terms_accepted = false;

    let result = service(MockUserRepository::new()).register(input).await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("terms")));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(test_account(1, "hashed"))));

    let result = service(users).register(register_input()).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_login_returns_token_and_account() {
    let hash = Password::new("Sup3rSecret").unwrap().into_string();
    let mut users = MockUserRepository::new();
    let stored = test_account(1, &hash);
    users
        .expect_find_by_email()
        .with(eq("test@example.com"))
        .returning(move |_| Ok(Some(stored.clone())));
    users.expect_record_login().with(eq(1)).returning(|_| Ok(()));

    let service = service(users);
    let response = service
        .login("Test@Example.com".to_string(), "Sup3rSecret".to_string())
        .await
        .unwrap();

    assert!(!response.token.access_token.is_empty());
    assert_eq!(response.token.token_type, "Bearer");
    assert_eq!(response.user.email, "test@example.com");

    // The issued token must verify against the same service
    let claims = service.verify_token(&response.token.access_token).unwrap();
    assert_eq!(claims.sub, 1);
    assert_eq!(claims.role, "user");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let hash = Password::new("Sup3rSecret").unwrap().into_string();
    let mut users = MockUserRepository::new();
    let stored = test_account(1, &hash);
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(stored.clone())));

    let result = service(users)
        .login("test@example.com".to_string(), "WrongPass1".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_rejects_unknown_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let result = service(users)
        .login("nobody@example.com".to_string(), "Sup3rSecret".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_rejects_deactivated_account() {
    let hash = Password::new("Sup3rSecret").unwrap().into_string();
    let mut users = MockUserRepository::new();
    let mut stored = test_account(1, &hash);
    stored.is_active = false;
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(stored.clone())));

    let result = service(users)
        .login("test@example.com".to_string(), "Sup3rSecret".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::AccountDeactivated));
}

#[tokio::test]
async fn test_verify_token_rejects_garbage() {
    let result = service(MockUserRepository::new()).verify_token("not-a-jwt");

    assert!(result.is_err());
}
