//! Product domain entity, quality scoring and catalog DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{MAX_QUALITY_SCORE, MIN_QUALITY_SCORE};

/// Coarse quality classification derived from the numeric score.
///
/// Canonical thresholds: >=90 excellent, >=70 good, >=50 fair, else poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => QualityLevel::Excellent,
            s if s >= 70 => QualityLevel::Good,
            s if s >= 50 => QualityLevel::Fair,
            _ => QualityLevel::Poor,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "excellent" => Some(QualityLevel::Excellent),
            "good" => Some(QualityLevel::Good),
            "fair" => Some(QualityLevel::Fair),
            "poor" => Some(QualityLevel::Poor),
            _ => None,
        }
    }
}

impl From<&str> for QualityLevel {
    fn from(s: &str) -> Self {
        QualityLevel::parse(s).unwrap_or(QualityLevel::Fair)
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QualityLevel::Excellent => "excellent",
            QualityLevel::Good => "good",
            QualityLevel::Fair => "fair",
            QualityLevel::Poor => "poor",
        };
        write!(f, "{}", name)
    }
}

/// Round a raw score to a whole number and clamp it into the valid range.
pub fn clamp_quality_score(raw: f64) -> i32 {
    let rounded = raw.round() as i64;
    rounded.clamp(MIN_QUALITY_SCORE as i64, MAX_QUALITY_SCORE as i64) as i32
}

/// Product domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Public identifier, also used as the foreign key in carts and orders
    #[serde(rename = "id")]
    pub product_id: String,
    pub name: String,
    pub category: String,
    #[schema(value_type = String, example = "3.50")]
    pub price: Decimal,
    pub quality_score: i32,
    pub quality_level: QualityLevel,
    pub description: String,
    pub health_benefits: Vec<String>,
    pub best_uses: Vec<String>,
    pub image: String,
    pub farmer: String,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub quality_assessment_date: Option<DateTime<Utc>>,
    pub stock: i32,
    pub location: String,
    pub certifications: Vec<String>,
    #[schema(value_type = Object)]
    pub inventory_metrics: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Data for inserting a new product (validated, score/level already derived)
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quality_score: i32,
    pub quality_level: QualityLevel,
    pub description: Option<String>,
    pub health_benefits: Vec<String>,
    pub best_uses: Vec<String>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub quality_assessment_date: Option<DateTime<Utc>>,
    pub stock: i32,
    pub location: Option<String>,
    pub certifications: Vec<String>,
    pub inventory_metrics: serde_json::Value,
}

/// Patchable product fields (the fixed allow-list).
///
/// A quality score patch carries the re-derived level and a fresh
/// assessment timestamp, filled in by the service before it reaches
/// the repository.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quality_score: Option<i32>,
    pub quality_level: Option<QualityLevel>,
    pub description: Option<String>,
    pub health_benefits: Option<Vec<String>>,
    pub best_uses: Option<Vec<String>>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<Option<NaiveDate>>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub quality_assessment_date: Option<DateTime<Utc>>,
    pub stock: Option<i32>,
    pub location: Option<String>,
    pub certifications: Option<Vec<String>>,
    pub inventory_metrics: Option<serde_json::Value>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quality_score.is_none()
            && self.description.is_none()
            && self.health_benefits.is_none()
            && self.best_uses.is_none()
            && self.image.is_none()
            && self.farmer.is_none()
            && self.harvest_date.is_none()
            && self.expiry_date.is_none()
            && self.stock.is_none()
            && self.location.is_none()
            && self.certifications.is_none()
            && self.inventory_metrics.is_none()
    }
}

/// Aggregate catalog counts for the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub total: i64,
    pub in_stock: i64,
    pub out_of_stock: i64,
    pub excellent: i64,
    pub good: i64,
    pub fair: i64,
    pub poor: i64,
    pub avg_quality_score: f64,
    pub avg_price: f64,
    pub total_stock: i64,
}
