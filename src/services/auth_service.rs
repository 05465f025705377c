//! Authentication service - registration, login and token handling.
//!
//! Uses the domain Password value object for hashing and the Unit of
//! Work for repository access. Login failures are uniform for unknown
//! email and wrong password; only deactivated accounts get a distinct
//! error, and that check happens after credential verification.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Account, AccountResponse, NewAccount, Password, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Token plus the safe account view, returned on login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: TokenResponse,
    pub user: AccountResponse,
}

/// Registration input, field formats already validated by the handler
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub postcode: String,
    pub address: String,
    pub city: String,
    pub terms_accepted: bool,
    pub newsletter: bool,
}

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account
    async fn register(&self, input: RegisterInput) -> AppResult<Account>;

    /// Login and return JWT token plus the account
    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for an account (shared helper to avoid duplication)
fn generate_token(account: &Account, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: account.id,
        email: account.email.clone(),
        role: account.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify JWT token and extract claims (shared helper)
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterInput) -> AppResult<Account> {
        // Field formats are validated by the handler's ValidatedJson extractor;
        // the cross-field rules live here.
        let mut errors = Vec::new();
        if input.password != input.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
        if !Password::meets_strength_rule(&input.password) {
            errors.push(
                "Password must be at least 8 characters with uppercase, lowercase, and number"
                    .to_string(),
            );
        }
        if !input.terms_accepted {
            errors.push("You must accept the terms and conditions".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::validation_all(errors));
        }

        // Uniqueness is case-insensitive; emails are stored lowercased
        let email = input.email.trim().to_lowercase();
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("An account with this email"));
        }

        let password_hash = Password::new(&input.password)?.into_string();

        self.uow
            .users()
            .create(NewAccount {
                first_name: input.first_name,
                last_name: input.last_name,
                email,
                phone: input.phone,
                password_hash,
                postcode: input.postcode,
                address: input.address,
                city: input.city,
                role: UserRole::User,
                terms_accepted: input.terms_accepted,
                newsletter: input.newsletter,
            })
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse> {
        let email = email.trim().to_lowercase();
        let account_result = self.uow.users().find_by_email(&email).await?;

        // SECURITY: Perform password verification even if the account doesn't
        // exist to prevent timing attacks that could enumerate valid emails.
        // We use a dummy hash that will always fail verification.
        let dummy_hash = "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, account_exists) = match &account_result {
            Some(account) => (account.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        if !account_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe: account_exists guarantees the value is present
        let account = account_result.ok_or(AppError::InvalidCredentials)?;

        // Deactivation is only disclosed once the credentials check out
        if !account.is_active {
            return Err(AppError::AccountDeactivated);
        }

        self.uow.users().record_login(account.id).await?;

        let token = generate_token(&account, &self.config)?;
        Ok(LoginResponse {
            token,
            user: AccountResponse::from(account),
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
