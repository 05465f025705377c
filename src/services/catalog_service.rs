//! Catalog service - product management business logic.
//!
//! Owns quality scoring: the raw score is rounded and clamped into
//! [0, 100], the level re-derived and the assessment date restamped
//! whenever the score changes.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::DEFAULT_FEATURED_LIMIT;
use crate::domain::{
    clamp_quality_score, CatalogStatistics, NewProduct, Product, ProductPatch, QualityLevel,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Default score recorded when a new product arrives without one
const DEFAULT_QUALITY_SCORE: f64 = 50.0;

/// New product input, field formats already validated by the handler
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Public identifier; generated as `product-{millis}` when absent
    pub product_id: Option<String>,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quality_score: Option<f64>,
    pub description: Option<String>,
    pub health_benefits: Vec<String>,
    pub best_uses: Vec<String>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub stock: i32,
    pub location: Option<String>,
    pub certifications: Vec<String>,
    pub inventory_metrics: Option<serde_json::Value>,
}

/// Product update input; `None` leaves a field untouched, the inner
/// `Option` on the dates clears them.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quality_score: Option<f64>,
    pub description: Option<String>,
    pub health_benefits: Option<Vec<String>>,
    pub best_uses: Option<Vec<String>>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<Option<NaiveDate>>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub stock: Option<i32>,
    pub location: Option<String>,
    pub certifications: Option<Vec<String>>,
    pub inventory_metrics: Option<serde_json::Value>,
}

/// Catalog service trait for dependency injection
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create a new product
    async fn create(&self, input: CreateProductInput) -> AppResult<Product>;

    /// All products, most recently updated first
    async fn get_all(&self) -> AppResult<Vec<Product>>;

    /// Get product by public identifier
    async fn get_by_id(&self, product_id: &str) -> AppResult<Product>;

    /// Products in a category, name order
    async fn get_by_category(&self, category: &str) -> AppResult<Vec<Product>>;

    /// Products at a quality level, best score first
    async fn get_by_quality_level(&self, level: &str) -> AppResult<Vec<Product>>;

    /// Excellent and good products by descending score
    async fn featured(&self, limit: Option<u64>) -> AppResult<Vec<Product>>;

    /// Case-insensitive substring search over name, description and farmer
    async fn search(&self, term: &str) -> AppResult<Vec<Product>>;

    /// Apply an update to a product
    async fn update(&self, product_id: &str, input: UpdateProductInput) -> AppResult<Product>;

    /// Delete a product
    async fn delete(&self, product_id: &str) -> AppResult<()>;

    /// Aggregate catalog counts
    async fn statistics(&self) -> AppResult<CatalogStatistics>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    /// Create new catalog service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.price < Decimal::ZERO {
            return Err(AppError::validation("Price cannot be negative"));
        }
        if input.stock < 0 {
            return Err(AppError::validation("Stock cannot be negative"));
        }

        if self.uow.products().find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict("A product with this name"));
        }

        let product_id = input
            .product_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("product-{}", Utc::now().timestamp_millis()));

        let score = clamp_quality_score(input.quality_score.unwrap_or(DEFAULT_QUALITY_SCORE));
        let level = QualityLevel::from_score(score);

        self.uow
            .products()
            .create(NewProduct {
                product_id,
                name: input.name,
                category: input.category,
                price: input.price,
                quality_score: score,
                quality_level: level,
                description: input.description,
                health_benefits: input.health_benefits,
                best_uses: input.best_uses,
                image: input.image,
                farmer: input.farmer,
                harvest_date: input.harvest_date,
                expiry_date: input.expiry_date,
                quality_assessment_date: input.quality_score.map(|_| Utc::now()),
                stock: input.stock,
                location: input.location,
                certifications: input.certifications,
                inventory_metrics: input
                    .inventory_metrics
                    .unwrap_or_else(|| serde_json::json!({})),
            })
            .await
    }

    async fn get_all(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list().await
    }

    async fn get_by_id(&self, product_id: &str) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_product_id(product_id)
            .await?
            .ok_or_not_found()
    }

    async fn get_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        self.uow.products().list_by_category(category).await
    }

    async fn get_by_quality_level(&self, level: &str) -> AppResult<Vec<Product>> {
        let level = QualityLevel::parse(level).ok_or_else(|| {
            AppError::validation("Quality level must be one of: excellent, good, fair, poor")
        })?;
        self.uow.products().list_by_quality_level(level).await
    }

    async fn featured(&self, limit: Option<u64>) -> AppResult<Vec<Product>> {
        self.uow
            .products()
            .featured(limit.unwrap_or(DEFAULT_FEATURED_LIMIT))
            .await
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::validation("Search term is required"));
        }
        self.uow.products().search(term).await
    }

    async fn update(&self, product_id: &str, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(AppError::validation("Price cannot be negative"));
            }
        }
        if let Some(stock) = input.stock {
            if stock < 0 {
                return Err(AppError::validation("Stock cannot be negative"));
            }
        }

        // A score change re-derives the level and restamps the assessment date
        let (quality_score, quality_level, assessed_at) = match input.quality_score {
            Some(raw) => {
                let score = clamp_quality_score(raw);
                (
                    Some(score),
                    Some(QualityLevel::from_score(score)),
                    Some(Utc::now()),
                )
            }
            None => (None, None, None),
        };

        let patch = ProductPatch {
            name: input.name,
            category: input.category,
            price: input.price,
            quality_score,
            quality_level,
            description: input.description,
            health_benefits: input.health_benefits,
            best_uses: input.best_uses,
            image: input.image,
            farmer: input.farmer,
            harvest_date: input.harvest_date,
            expiry_date: input.expiry_date,
            quality_assessment_date: assessed_at,
            stock: input.stock,
            location: input.location,
            certifications: input.certifications,
            inventory_metrics: input.inventory_metrics,
        };

        if patch.is_empty() {
            return Err(AppError::validation("No updatable fields provided"));
        }

        self.uow.products().update(product_id, patch).await
    }

    async fn delete(&self, product_id: &str) -> AppResult<()> {
        self.uow.products().delete(product_id).await
    }

    async fn statistics(&self) -> AppResult<CatalogStatistics> {
        self.uow.products().statistics().await
    }
}
