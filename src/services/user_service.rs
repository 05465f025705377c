//! User service - account management business logic.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Account, AccountStatistics, Password, ProfileChanges, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get account by ID
    async fn get_user(&self, id: i32) -> AppResult<Account>;

    /// List all accounts, newest first
    async fn list_users(&self) -> AppResult<Vec<Account>>;

    /// List accounts holding a role; the value must be a known role
    async fn list_by_role(&self, role: &str) -> AppResult<Vec<Account>>;

    /// Apply profile changes; email and password are not patchable
    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> AppResult<Account>;

    /// Change the account role; the value must be a known role
    async fn update_role(&self, id: i32, role: &str) -> AppResult<Account>;

    /// Activate or deactivate without deleting anything.
    ///
    /// Account removal goes through deactivation; order history and
    /// carts are never dropped from the API.
    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Account>;

    /// Replace the password after verifying the current one
    async fn change_password(&self, id: i32, current: &str, new: &str) -> AppResult<()>;

    /// Aggregate account counts
    async fn statistics(&self) -> AppResult<AccountStatistics>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<Account> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<Account>> {
        self.uow.users().list().await
    }

    async fn list_by_role(&self, role: &str) -> AppResult<Vec<Account>> {
        let role = UserRole::parse(role)
            .ok_or_else(|| AppError::validation("Role must be either 'user' or 'admin'"))?;
        self.uow.users().find_by_role(role).await
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> AppResult<Account> {
        if changes.is_empty() {
            return Err(AppError::validation("No updatable fields provided"));
        }
        self.uow.users().update_profile(id, changes).await
    }

    async fn update_role(&self, id: i32, role: &str) -> AppResult<Account> {
        let role = UserRole::parse(role)
            .ok_or_else(|| AppError::validation("Role must be either 'user' or 'admin'"))?;
        self.uow.users().update_role(id, role).await
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Account> {
        self.uow.users().set_active(id, is_active).await
    }

    async fn change_password(&self, id: i32, current: &str, new: &str) -> AppResult<()> {
        let account = self.uow.users().find_by_id(id).await?.ok_or_not_found()?;

        if !Password::from_hash(account.password_hash).verify(current) {
            return Err(AppError::validation("Current password is incorrect"));
        }

        let password_hash = Password::new(new)?.into_string();
        self.uow.users().update_password(id, password_hash).await
    }

    async fn statistics(&self) -> AppResult<AccountStatistics> {
        self.uow.users().statistics().await
    }
}
