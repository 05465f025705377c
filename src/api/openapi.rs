//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, cart_handler, order_handler, product_handler, user_handler,
};
use crate::domain::{
    AccountResponse, AccountStatistics, CartItemView, CartLine, CartStatistics, CartSummary,
    CatalogStatistics, Order, OrderLine, OrderStatus, Product, QualityLevel, UserRole,
};
use crate::services::{LoginResponse, TokenResponse};

/// OpenAPI documentation for the FarmFresh market API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FarmFresh Market API",
        version = "0.1.0",
        description = "A local farmers market storefront: catalog, carts, checkout and accounts",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Catalog endpoints
        product_handler::list_products,
        product_handler::featured_products,
        product_handler::search_products,
        product_handler::catalog_statistics,
        product_handler::products_by_category,
        product_handler::products_by_quality,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        // Cart endpoints
        cart_handler::get_cart,
        cart_handler::item_count,
        cart_handler::cart_statistics,
        cart_handler::add_item,
        cart_handler::update_item,
        cart_handler::remove_item,
        cart_handler::clear_cart,
        // Order endpoints
        order_handler::create_order,
        order_handler::get_order,
        order_handler::orders_by_user,
        order_handler::update_order_status,
        // User endpoints
        user_handler::list_users,
        user_handler::user_statistics,
        user_handler::list_users_by_role,
        user_handler::get_user,
        user_handler::update_profile,
        user_handler::update_role,
        user_handler::update_status,
        user_handler::change_password,
        user_handler::delete_user,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            AccountResponse,
            AccountStatistics,
            Product,
            QualityLevel,
            CatalogStatistics,
            CartLine,
            CartItemView,
            CartSummary,
            CartStatistics,
            Order,
            OrderLine,
            OrderStatus,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            LoginResponse,
            // Handler request types
            user_handler::UpdateProfileRequest,
            user_handler::UpdateRoleRequest,
            user_handler::UpdateStatusRequest,
            user_handler::ChangePasswordRequest,
            product_handler::CreateProductRequest,
            product_handler::UpdateProductRequest,
            cart_handler::AddCartItemRequest,
            cart_handler::UpdateCartItemRequest,
            order_handler::CreateOrderRequest,
            order_handler::OrderItemRequest,
            order_handler::UpdateOrderStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration and login"),
        (name = "Products", description = "Catalog browsing and management"),
        (name = "Cart", description = "Shopping cart operations"),
        (name = "Orders", description = "Checkout and order tracking"),
        (name = "Users", description = "Account management operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
