//! Catalog handlers.
//!
//! Reads are public; create, update and delete require an admin token,
//! checked via the `CurrentUser` extractor since this router mixes
//! public and protected routes.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CatalogStatistics, Product};
use crate::errors::AppResult;
use crate::services::{CreateProductInput, UpdateProductInput};
use crate::types::{ApiResponse, Created, NoContent};

/// New product request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Public identifier; generated when absent
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Product name is required"))]
    #[schema(example = "Heritage Carrots")]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    #[schema(example = "vegetables")]
    pub category: String,
    #[schema(value_type = String, example = "3.50")]
    pub price: Decimal,
    pub quality_score: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub health_benefits: Vec<String>,
    #[serde(default)]
    pub best_uses: Vec<String>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub stock: i32,
    pub location: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[schema(value_type = Object)]
    pub inventory_metrics: Option<serde_json::Value>,
}

/// Deserialize a present-but-possibly-null field into `Some(inner)`,
/// so an absent field (None) can be told apart from an explicit null.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Product update request; omitted fields stay untouched, explicit
/// nulls clear the date fields
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[schema(value_type = Option<String>, example = "3.50")]
    pub price: Option<Decimal>,
    pub quality_score: Option<f64>,
    pub description: Option<String>,
    pub health_benefits: Option<Vec<String>>,
    pub best_uses: Option<Vec<String>>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub harvest_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub expiry_date: Option<Option<NaiveDate>>,
    pub stock: Option<i32>,
    pub location: Option<String>,
    pub certifications: Option<Vec<String>>,
    #[schema(value_type = Object)]
    pub inventory_metrics: Option<serde_json::Value>,
}

impl From<UpdateProductRequest> for UpdateProductInput {
    fn from(req: UpdateProductRequest) -> Self {
        UpdateProductInput {
            name: req.name,
            category: req.category,
            price: req.price,
            quality_score: req.quality_score,
            description: req.description,
            health_benefits: req.health_benefits,
            best_uses: req.best_uses,
            image: req.image,
            farmer: req.farmer,
            harvest_date: req.harvest_date,
            expiry_date: req.expiry_date,
            stock: req.stock,
            location: req.location,
            certifications: req.certifications,
            inventory_metrics: req.inventory_metrics,
        }
    }
}

/// Search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Search term matched against name, description and farmer
    pub q: String,
}

/// Featured products query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct FeaturedQuery {
    /// Maximum number of products to return (default 6)
    pub limit: Option<u64>,
}

/// Create catalog routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(featured_products))
        .route("/search", get(search_products))
        .route("/statistics", get(catalog_statistics))
        .route("/category/:category", get(products_by_category))
        .route("/quality/:level", get(products_by_quality))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List all products, most recently updated first
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses((status = 200, description = "All products", body = [Product]))
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service.get_all().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Featured products: excellent and good quality, best score first
#[utoipa::path(
    get,
    path = "/products/featured",
    tag = "Products",
    params(FeaturedQuery),
    responses((status = 200, description = "Featured products", body = [Product]))
)]
pub async fn featured_products(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service.featured(query.limit).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Search products by name, description or farmer
#[utoipa::path(
    get,
    path = "/products/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = [Product]),
        (status = 400, description = "Missing search term")
    )
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service.search(&query.q).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Aggregate catalog statistics
#[utoipa::path(
    get,
    path = "/products/statistics",
    tag = "Products",
    responses((status = 200, description = "Catalog statistics", body = CatalogStatistics))
)]
pub async fn catalog_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CatalogStatistics>>> {
    let stats = state.catalog_service.statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Products in a category, name order
#[utoipa::path(
    get,
    path = "/products/category/{category}",
    tag = "Products",
    params(("category" = String, Path, description = "Category name")),
    responses((status = 200, description = "Products in the category", body = [Product]))
)]
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service.get_by_category(&category).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Products at a quality level, best score first
#[utoipa::path(
    get,
    path = "/products/quality/{level}",
    tag = "Products",
    params(("level" = String, Path, description = "excellent, good, fair or poor")),
    responses(
        (status = 200, description = "Products at the level", body = [Product]),
        (status = 400, description = "Unknown quality level")
    )
)]
pub async fn products_by_quality(
    State(state): State<AppState>,
    Path(level): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service.get_by_quality_level(&level).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Get one product by its public identifier
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Public product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.catalog_service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Create a new product (admin only)
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Duplicate product name")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Created<Product>> {
    require_admin(&user)?;

    let product = state
        .catalog_service
        .create(CreateProductInput {
            product_id: payload.id,
            name: payload.name,
            category: payload.category,
            price: payload.price,
            quality_score: payload.quality_score,
            description: payload.description,
            health_benefits: payload.health_benefits,
            best_uses: payload.best_uses,
            image: payload.image,
            farmer: payload.farmer,
            harvest_date: payload.harvest_date,
            expiry_date: payload.expiry_date,
            stock: payload.stock,
            location: payload.location,
            certifications: payload.certifications,
            inventory_metrics: payload.inventory_metrics,
        })
        .await?;

    Ok(Created(product))
}

/// Update a product (admin only)
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    require_admin(&user)?;
    let product = state.catalog_service.update(&id, payload.into()).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Delete a product (admin only)
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.catalog_service.delete(&id).await?;
    Ok(NoContent)
}
