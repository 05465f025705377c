//! Account management handlers.
//!
//! All routes sit behind the JWT middleware; admin-only operations
//! check the role explicitly.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_self_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{AccountResponse, AccountStatistics, ProfileChanges};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Profile update request; email and password are not patchable
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub newsletter: Option<bool>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            postcode: req.postcode,
            address: req.address,
            city: req.city,
            newsletter: req.newsletter,
        }
    }
}

/// Role change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "Role is required"))]
    #[schema(example = "admin")]
    pub role: String,
}

/// Activation flag request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

/// Password change request; the current password must be supplied
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Create account management routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/statistics", get(user_statistics))
        .route("/role/:role", get(list_users_by_role))
        .route("/:id", get(get_user).put(update_profile).delete(delete_user))
        .route("/:id/role", put(update_role))
        .route("/:id/status", put(update_status))
        .route("/:id/password", put(change_password))
}

/// List all accounts (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AccountResponse>>>> {
    require_admin(&user)?;
    let accounts = state.user_service.list_users().await?;
    let accounts = accounts.into_iter().map(AccountResponse::from).collect();
    Ok(Json(ApiResponse::success(accounts)))
}

/// Aggregate account statistics (admin only)
#[utoipa::path(
    get,
    path = "/users/statistics",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account statistics", body = AccountStatistics),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn user_statistics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<AccountStatistics>>> {
    require_admin(&user)?;
    let stats = state.user_service.statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// List accounts holding a role (admin only)
#[utoipa::path(
    get,
    path = "/users/role/{role}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("role" = String, Path, description = "Role to filter by, 'user' or 'admin'")),
    responses(
        (status = 200, description = "Accounts with the role", body = [AccountResponse]),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users_by_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(role): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<AccountResponse>>>> {
    require_admin(&user)?;
    let accounts = state.user_service.list_by_role(&role).await?;
    let accounts = accounts.into_iter().map(AccountResponse::from).collect();
    Ok(Json(ApiResponse::success(accounts)))
}

/// Get one account; users can only read their own
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "The account", body = AccountResponse),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    require_self_or_admin(&user, id)?;
    let account = state.user_service.get_user(id).await?;
    Ok(Json(ApiResponse::success(AccountResponse::from(account))))
}

/// Update profile fields; users can only update their own
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    require_self_or_admin(&user, id)?;
    let account = state
        .user_service
        .update_profile(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(AccountResponse::from(account))))
}

/// Change an account's role (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    require_admin(&user)?;
    let account = state.user_service.update_role(id, &payload.role).await?;
    Ok(Json(ApiResponse::success(AccountResponse::from(account))))
}

/// Activate or deactivate an account (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/status",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    require_admin(&user)?;
    let account = state
        .user_service
        .set_active(id, payload.is_active)
        .await?;
    Ok(Json(ApiResponse::success(AccountResponse::from(account))))
}

/// Change an account's password; the current password must verify
#[utoipa::path(
    put,
    path = "/users/{id}/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Current password incorrect or new password too weak"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    require_self_or_admin(&user, id)?;
    state
        .user_service
        .change_password(id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password updated successfully")))
}

/// Soft delete: the account is deactivated, its carts and order
/// history stay in place (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deactivated", body = AccountResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    require_admin(&user)?;
    let account = state.user_service.set_active(id, false).await?;
    Ok(Json(ApiResponse::with_message(
        AccountResponse::from(account),
        "User deactivated successfully",
    )))
}
