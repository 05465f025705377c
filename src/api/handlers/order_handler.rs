//! Order handlers.
//!
//! All routes sit behind the JWT middleware; placing an order is the
//! transactional workflow, status changes are admin-only.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_self_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::Order;
use crate::errors::{AppError, AppResult};
use crate::services::{CreateOrderInput, OrderItemInput};
use crate::types::{ApiResponse, Created};

/// One line of an incoming order
#[derive(Debug, serde::Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    /// Product name frozen into the order snapshot
    pub name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "3.00")]
    pub price: Decimal,
    /// Line subtotal; computed from price and quantity when absent
    #[schema(value_type = Option<String>, example = "12.00")]
    pub subtotal: Option<Decimal>,
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Defaults to the authenticated user
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    #[schema(value_type = String, example = "12.00")]
    pub subtotal: Decimal,
    #[serde(default)]
    #[schema(value_type = String, example = "2.50")]
    pub delivery_cost: Decimal,
    #[serde(default)]
    #[schema(value_type = String, example = "0.60")]
    pub tax: Decimal,
    #[schema(value_type = String, example = "15.10")]
    pub total: Decimal,
    pub delivery_method: Option<String>,
    pub payment_method: Option<String>,
    #[schema(value_type = Object)]
    pub shipping_address: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub payment_info: Option<serde_json::Value>,
    pub special_instructions: Option<String>,
    /// Accepts plain dates, RFC 3339 timestamps and long-form display dates
    #[schema(example = "2024-01-15")]
    pub estimated_delivery: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[schema(example = "shipped")]
    pub status: String,
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/user/:user_id", get(orders_by_user))
        .route("/:order_id", get(get_order))
        .route("/:order_id/status", put(update_order_status))
}

/// Place an order; header, line snapshots and stock adjustments commit atomically
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Buyer not found")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<Order>> {
    let user_id = payload.user_id.unwrap_or(user.id);
    require_self_or_admin(&user, user_id)?;

    let order = state
        .order_service
        .create_order(CreateOrderInput {
            user_id,
            items: payload
                .items
                .into_iter()
                .map(|item| OrderItemInput {
                    product_id: item.product_id,
                    product_name: item.name,
                    quantity: item.quantity,
                    price: item.price,
                    subtotal: item.subtotal,
                })
                .collect(),
            subtotal: payload.subtotal,
            delivery_cost: payload.delivery_cost,
            tax: payload.tax,
            total: payload.total,
            delivery_method: payload.delivery_method,
            payment_method: payload.payment_method,
            shipping_address: payload.shipping_address,
            payment_info: payload.payment_info,
            special_instructions: payload.special_instructions,
            estimated_delivery: payload.estimated_delivery,
        })
        .await?;

    Ok(Created(order))
}

/// Get one order by its public order id; owner or admin only
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Public order id")),
    responses(
        (status = 200, description = "The order", body = Order),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.order_service.get_order(&order_id).await?;
    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(ApiResponse::success(order)))
}

/// A user's orders, newest first
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User id")),
    responses((status = 200, description = "The user's orders", body = [Order]))
)]
pub async fn orders_by_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    require_self_or_admin(&user, user_id)?;
    let orders = state.order_service.get_orders_by_user(user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Overwrite an order's status (admin only)
#[utoipa::path(
    put,
    path = "/orders/{order_id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Public order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    require_admin(&user)?;
    let order = state
        .order_service
        .update_status(&order_id, &payload.status)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
