//! User service unit tests.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;

use farmfresh::domain::{Account, Password, ProfileChanges, UserRole};
use farmfresh::errors::AppError;
use farmfresh::infra::{
    MockCartRepository, MockOrderRepository, MockProductRepository, MockUserRepository,
};
use farmfresh::services::{UserManager, UserService};

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

fn uow_with_users(users: MockUserRepository) -> TestUnitOfWork {
    TestUnitOfWork::new(
        users,
        MockProductRepository::new(),
        MockCartRepository::new(),
        MockOrderRepository::new(),
    )
}

#[tokio::test]
async fn test_get_user_success() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(42))
        .returning(|id| Ok(Some(test_account(id))));

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.get_user(42).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().id, 42);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.get_user(7).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_success() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .returning(|| Ok(vec![test_account(1), test_account(2)]));

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.list_users().await;

    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_profile_rejects_empty_changes() {
    let repo = MockUserRepository::new();

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.update_profile(1, ProfileChanges::default()).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_profile_applies_changes() {
    let mut repo = MockUserRepository::new();
    repo.expect_update_profile().returning(|id, changes| {
        let mut account = test_account(id);
        if let Some(city) = changes.city {
            account.city = city;
        }
        Ok(account)
    });

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let changes = ProfileChanges {
        city: Some("Amersfoort".to_string()),
        ..Default::default()
    };
    let result = service.update_profile(1, changes).await;

    assert_eq!(result.unwrap().city, "Amersfoort");
}

#[tokio::test]
async fn test_update_role_success() {
    let mut repo = MockUserRepository::new();
    repo.expect_update_role()
        .with(eq(5), eq(UserRole::Admin))
        .returning(|id, role| {
            let mut account = test_account(id);
            account.role = role;
            Ok(account)
        });

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.update_role(5, "admin").await;

    assert_eq!(result.unwrap().role, UserRole::Admin);
}

#[tokio::test]
async fn test_update_role_rejects_unknown_role() {
    let repo = MockUserRepository::new();

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.update_role(5, "superuser").await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_set_active_deactivates_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_set_active()
        .with(eq(3), eq(false))
        .returning(|id, is_active| {
            let mut account = test_account(id);
            account.is_active = is_active;
            Ok(account)
        });

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.set_active(3, false).await;

    assert!(!result.unwrap().is_active);
}

#[tokio::test]
async fn test_deactivated_account_stays_retrievable() {
    // Removal deactivates; the account and its history survive.
    let mut repo = MockUserRepository::new();
    repo.expect_delete().never();
    repo.expect_set_active()
        .with(eq(9), eq(false))
        .returning(|id, is_active| {
            let mut account = test_account(id);
            account.is_active = is_active;
            Ok(account)
        });
    repo.expect_find_by_id().with(eq(9)).returning(|id| {
        let mut account = test_account(id);
        account.is_active = false;
        Ok(Some(account))
    });

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let deactivated = service.set_active(9, false).await.unwrap();
    assert!(!deactivated.is_active);

    let fetched = service.get_user(9).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn test_list_by_role_success() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_role()
        .with(eq(UserRole::Admin))
        .returning(|role| {
            let mut account = test_account(1);
            account.role = role;
            Ok(vec![account])
        });

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.list_by_role("admin").await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].role, UserRole::Admin);
}

#[tokio::test]
async fn test_list_by_role_rejects_unknown_role() {
    let repo = MockUserRepository::new();

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.list_by_role("moderator").await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_change_password_success() {
    let current_hash = Password::new("Old3rSecret").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().with(eq(4)).returning(move |id| {
        let mut account = test_account(id);
        account.password_hash = current_hash.clone();
        Ok(Some(account))
    });
    repo.expect_update_password()
        .with(eq(4), mockall::predicate::always())
        .times(1)
        .returning(|_, _| Ok(()));

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.change_password(4, "Old3rSecret", "New3rSecret").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_change_password_rejects_wrong_current_password() {
    let current_hash = Password::new("Old3rSecret").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(move |id| {
        let mut account = test_account(id);
        account.password_hash = current_hash.clone();
        Ok(Some(account))
    });
    repo.expect_update_password().never();

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.change_password(4, "WrongGuess1", "New3rSecret").await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_change_password_rejects_weak_new_password() {
    let current_hash = Password::new("Old3rSecret").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(move |id| {
        let mut account = test_account(id);
        account.password_hash = current_hash.clone();
        Ok(Some(account))
    });
    repo.expect_update_password().never();

    let service = UserManager::new(Arc::new(uow_with_users(repo)));
    let result = service.change_password(4, "Old3rSecret", "weak").await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}
