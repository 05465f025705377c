//! Order entities, status enumeration and checkout helpers.
//!
//! Order lines are frozen snapshots of what the buyer was shown at
//! checkout; later catalog edits never change a placed order.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ORDER_ID_PREFIX;

/// Order lifecycle states.
///
/// The happy path runs pending -> processing -> shipped -> delivered,
/// with cancellation as the exceptional exit. Transitions are not
/// enforced; any valid status may overwrite any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        OrderStatus::parse(s).unwrap_or(OrderStatus::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// An immutable order line snapshot
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "3.00")]
    pub price: Decimal,
    #[schema(value_type = String, example = "12.00")]
    pub subtotal: Decimal,
}

/// A placed order: header plus its line snapshots
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: i32,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "12.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "2.50")]
    pub delivery_cost: Decimal,
    #[schema(value_type = String, example = "0.60")]
    pub tax: Decimal,
    #[schema(value_type = String, example = "15.10")]
    pub total: Decimal,
    pub delivery_method: String,
    pub payment_method: String,
    /// Decoded leniently; malformed stored JSON becomes an empty object
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    #[schema(value_type = Object)]
    pub payment_info: serde_json::Value,
    pub special_instructions: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}

/// Validated order input, ready for the transactional insert.
///
/// Status is not carried here; new orders are always written as pending.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub user_id: i32,
    pub subtotal: Decimal,
    pub delivery_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub delivery_method: String,
    pub payment_method: String,
    pub shipping_address: serde_json::Value,
    pub payment_info: serde_json::Value,
    pub special_instructions: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    pub items: Vec<NewOrderLine>,
}

/// One line of an incoming order, snapshot values from the request
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// Generate a unique time-based order identifier, e.g. `ORD-1735686000000-a1b2c3d4e`.
pub fn generate_order_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", ORDER_ID_PREFIX, millis, &suffix[..9])
}

/// Normalize a caller-supplied delivery date into a canonical date.
///
/// Accepts plain dates, RFC 3339 timestamps and long-form display dates
/// ("Monday, 15 January 2024"). Anything unparseable yields `None` so a
/// bad date never fails the whole order.
pub fn normalize_delivery_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%A, %d %B %Y") {
        return Some(date);
    }

    tracing::warn!(value = trimmed, "Invalid estimated delivery date, leaving unset");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_is_unique_and_prefixed() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert!(a.starts_with("ORD-"));
        assert_ne!(a, b);
    }

    #[test]
    fn delivery_date_accepts_plain_dates() {
        assert_eq!(
            normalize_delivery_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn delivery_date_accepts_rfc3339() {
        assert_eq!(
            normalize_delivery_date("2024-01-15T09:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn delivery_date_accepts_display_format() {
        assert_eq!(
            normalize_delivery_date("Monday, 15 January 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn delivery_date_failure_is_none_not_error() {
        assert_eq!(normalize_delivery_date("next tuesday"), None);
        assert_eq!(normalize_delivery_date(""), None);
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(OrderStatus::parse("shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("teleported"), None);
    }
}
