//! Shared types used across API handlers.

mod response;

pub use response::{ApiResponse, Created, NoContent};
