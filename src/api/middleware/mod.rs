//! HTTP middleware.

mod auth;

pub use auth::{auth_middleware, require_admin, require_self_or_admin, CurrentUser};
