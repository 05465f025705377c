//! Cart line entity and enriched cart views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::QualityLevel;

/// A raw cart line as stored, one row per (user, product)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i32,
    pub user_id: i32,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the live product it references
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: i32,
    pub user_id: i32,
    pub product_id: String,
    pub quantity: i32,
    pub name: String,
    #[schema(value_type = String, example = "3.50")]
    pub price: Decimal,
    pub image: String,
    pub category: String,
    pub stock: i32,
    pub quality_score: i32,
    pub quality_level: QualityLevel,
    #[schema(value_type = String, example = "7.00")]
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's full cart with computed totals
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItemView>,
    #[schema(value_type = String, example = "12.00")]
    pub total: Decimal,
    pub item_count: i64,
}

impl CartSummary {
    /// Build a summary from enriched lines, computing the totals
    pub fn from_items(items: Vec<CartItemView>) -> Self {
        let total = items.iter().map(|i| i.subtotal).sum();
        let item_count = items.iter().map(|i| i64::from(i.quantity)).sum();
        Self {
            items,
            total,
            item_count,
        }
    }
}

/// Per-user cart statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartStatistics {
    pub item_count: i64,
    #[schema(value_type = String, example = "12.00")]
    pub total: Decimal,
    pub unique_item_count: usize,
}

impl From<&CartSummary> for CartStatistics {
    fn from(cart: &CartSummary) -> Self {
        Self {
            item_count: cart.item_count,
            total: cart.total,
            unique_item_count: cart.items.len(),
        }
    }
}
