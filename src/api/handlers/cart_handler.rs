//! Cart handlers.
//!
//! All routes sit behind the JWT middleware. The `{id}` segment is a
//! user id on GET routes and a cart line id on PUT/DELETE, mirroring
//! how clients address carts versus individual lines.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_self_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CartLine, CartStatistics, CartSummary};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

/// Add-to-cart request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    /// Defaults to the authenticated user
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "Product id is required"))]
    pub product_id: String,
    /// Defaults to 1
    pub quantity: Option<i32>,
}

/// Quantity update request; zero or less removes the line
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Create cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_item))
        .route("/user/:id", delete(clear_cart))
        .route("/:id", get(get_cart).put(update_item).delete(remove_item))
        .route("/:id/count", get(item_count))
        .route("/:id/statistics", get(cart_statistics))
}

/// Get a user's cart with live product data and totals
#[utoipa::path(
    get,
    path = "/cart/{id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, description = "The cart", body = CartSummary))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    require_self_or_admin(&user, user_id)?;
    let cart = state.cart_service.get_cart(user_id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

/// Sum of quantities in a user's cart
#[utoipa::path(
    get,
    path = "/cart/{id}/count",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, description = "Item count"))
)]
pub async fn item_count(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<i64>>> {
    require_self_or_admin(&user, user_id)?;
    let count = state.cart_service.item_count(user_id).await?;
    Ok(Json(ApiResponse::success(count)))
}

/// Per-user cart statistics
#[utoipa::path(
    get,
    path = "/cart/{id}/statistics",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, description = "Cart statistics", body = CartStatistics))
)]
pub async fn cart_statistics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartStatistics>>> {
    require_self_or_admin(&user, user_id)?;
    let stats = state.cart_service.statistics(user_id).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Add a product to a cart, merging with any existing line
#[utoipa::path(
    post,
    path = "/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "The cart line", body = CartLine),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Insufficient stock")
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddCartItemRequest>,
) -> AppResult<Created<CartLine>> {
    let user_id = payload.user_id.unwrap_or(user.id);
    require_self_or_admin(&user, user_id)?;

    let line = state
        .cart_service
        .add_item(user_id, &payload.product_id, payload.quantity.unwrap_or(1))
        .await?;
    Ok(Created(line))
}

/// Replace a line's quantity; zero or less removes it
#[utoipa::path(
    put,
    path = "/cart/{id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Cart line id")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated or removed line"),
        (status = 404, description = "Line not found"),
        (status = 422, description = "Insufficient stock")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(line_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<Option<CartLine>>>> {
    let line = state
        .cart_service
        .update_quantity(line_id, payload.quantity)
        .await?;

    Ok(Json(match line {
        Some(line) => ApiResponse::success(Some(line)),
        None => ApiResponse::with_message(None, "Item removed from cart"),
    }))
}

/// Remove a single line
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Cart line id")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Line not found")
    )
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(line_id): Path<i32>,
) -> AppResult<NoContent> {
    state.cart_service.remove_item(line_id).await?;
    Ok(NoContent)
}

/// Empty a user's cart
#[utoipa::path(
    delete,
    path = "/cart/user/{id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, description = "Cart cleared"))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    require_self_or_admin(&user, user_id)?;
    let removed = state.cart_service.clear_cart(user_id).await?;
    Ok(Json(ApiResponse::message(format!(
        "Removed {} item(s) from cart",
        removed
    ))))
}
