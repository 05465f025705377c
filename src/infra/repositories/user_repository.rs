//! Account repository - persistence for the `users` table.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Set, Statement,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::user::{self, Entity as UserEntity};
use crate::config::RECENT_SIGNUP_WINDOW_DAYS;
use crate::domain::{Account, AccountStatistics, NewAccount, ProfileChanges, UserRole};
use crate::errors::{AppError, AppResult};

/// Account repository trait for dependency injection.
///
/// Email lookups expect the address already lowercased; the service
/// layer normalizes before calling in.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find account by primary key
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Find account by (lowercased) email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Insert a new account
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    /// Apply profile changes; untouched fields keep their values
    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> AppResult<Account>;

    /// Change the account role
    async fn update_role(&self, id: i32, role: UserRole) -> AppResult<Account>;

    /// Activate or deactivate the account
    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Account>;

    /// Overwrite the stored password hash
    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()>;

    /// Stamp last_login with the current time
    async fn record_login(&self, id: i32) -> AppResult<()>;

    /// Hard delete; carts and orders cascade at the database level.
    ///
    /// No route reaches this; the API deactivates instead. Kept for
    /// maintenance jobs and test teardown.
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// List all accounts, newest first
    async fn list(&self) -> AppResult<Vec<Account>>;

    /// List accounts holding a role, newest first
    async fn find_by_role(&self, role: UserRole) -> AppResult<Vec<Account>>;

    /// Aggregate account counts
    async fn statistics(&self) -> AppResult<AccountStatistics>;
}

/// SeaORM-backed account repository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require(&self, id: i32) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[derive(FromQueryResult)]
struct AccountStatsRow {
    total: i64,
    active: i64,
    inactive: i64,
    newsletter: i64,
    recent: i64,
    admins: i64,
    users: i64,
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(Account::from))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let now = Utc::now();
        let active_model = user::ActiveModel {
            first_name: Set(account.first_name),
            last_name: Set(account.last_name),
            email: Set(account.email),
            phone: Set(account.phone),
            password_hash: Set(account.password_hash),
            postcode: Set(account.postcode),
            address: Set(account.address),
            city: Set(account.city),
            role: Set(account.role.to_string()),
            terms_accepted: Set(account.terms_accepted),
            newsletter: Set(account.newsletter),
            is_active: Set(true),
            created_at: Set(now),
            last_login: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Account::from(model))
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> AppResult<Account> {
        let mut active: user::ActiveModel = self.require(id).await?.into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(postcode) = changes.postcode {
            active.postcode = Set(postcode);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(newsletter) = changes.newsletter {
            active.newsletter = Set(newsletter);
        }

        let model = active.update(&self.db).await?;
        Ok(Account::from(model))
    }

    async fn update_role(&self, id: i32, role: UserRole) -> AppResult<Account> {
        let mut active: user::ActiveModel = self.require(id).await?.into();
        active.role = Set(role.to_string());
        let model = active.update(&self.db).await?;
        Ok(Account::from(model))
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Account> {
        let mut active: user::ActiveModel = self.require(id).await?.into();
        active.is_active = Set(is_active);
        let model = active.update(&self.db).await?;
        Ok(Account::from(model))
    }

    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()> {
        let mut active: user::ActiveModel = self.require(id).await?.into();
        active.password_hash = Set(password_hash);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn record_login(&self, id: i32) -> AppResult<()> {
        let mut active: user::ActiveModel = self.require(id).await?.into();
        active.last_login = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn find_by_role(&self, role: UserRole) -> AppResult<Vec<Account>> {
        let models = UserEntity::find()
            .filter(user::Column::Role.eq(role.to_string()))
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn statistics(&self) -> AppResult<AccountStatistics> {
        let cutoff = Utc::now() - Duration::days(RECENT_SIGNUP_WINDOW_DAYS);

        let row = AccountStatsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT
                COUNT(*)::BIGINT AS total,
                COUNT(*) FILTER (WHERE is_active)::BIGINT AS active,
                COUNT(*) FILTER (WHERE NOT is_active)::BIGINT AS inactive,
                COUNT(*) FILTER (WHERE newsletter)::BIGINT AS newsletter,
                COUNT(*) FILTER (WHERE created_at >= $1)::BIGINT AS recent,
                COUNT(*) FILTER (WHERE role = 'admin')::BIGINT AS admins,
                COUNT(*) FILTER (WHERE role = 'user')::BIGINT AS users
            FROM users
            "#,
            [cutoff.into()],
        ))
        .one(&self.db)
        .await?
        .ok_or_else(|| AppError::internal("Account statistics query returned no row"))?;

        Ok(AccountStatistics {
            total: row.total,
            active: row.active,
            inactive: row.inactive,
            newsletter: row.newsletter,
            recent: row.recent,
            admins: row.admins,
            users: row.users,
        })
    }
}
