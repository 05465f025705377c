//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Parse a role value, rejecting anything outside the known set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ROLE_ADMIN => Some(UserRole::Admin),
            ROLE_USER => Some(UserRole::User),
            _ => None,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        UserRole::parse(s).unwrap_or(UserRole::User)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Stored lowercase; uniqueness is case-insensitive
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub postcode: String,
    pub address: String,
    pub city: String,
    pub role: UserRole,
    pub terms_accepted: bool,
    pub newsletter: bool,
    /// Deactivation flag; deactivation never deletes the row
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Check if account has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data for inserting a new account (password already hashed)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub postcode: String,
    pub address: String,
    pub city: String,
    pub role: UserRole,
    pub terms_accepted: bool,
    pub newsletter: bool,
}

/// Patchable profile fields; email and password are deliberately absent
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub newsletter: Option<bool>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.postcode.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.newsletter.is_none()
    }
}

/// Account response (safe to return to clients, no credential hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i32,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub phone: String,
    pub postcode: String,
    pub address: String,
    pub city: String,
    #[schema(example = "user")]
    pub role: String,
    pub newsletter: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            postcode: account.postcode,
            address: account.address,
            city: account.city,
            role: account.role.to_string(),
            newsletter: account.newsletter,
            is_active: account.is_active,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}

/// Aggregate account counts for the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatistics {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub newsletter: i64,
    /// Accounts created within the last 30 days
    pub recent: i64,
    pub admins: i64,
    pub users: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_rejects_unknown_values() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn role_display_round_trips() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::User.to_string(), "user");
    }
}
