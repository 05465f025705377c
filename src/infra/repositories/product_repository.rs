//! Catalog repository - persistence for the `products` table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::product::{self, Entity as ProductEntity};
use crate::domain::{CatalogStatistics, NewProduct, Product, ProductPatch, QualityLevel};
use crate::errors::{AppError, AppResult};

/// Catalog repository trait for dependency injection
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find product by its public identifier
    async fn find_by_product_id(&self, product_id: &str) -> AppResult<Option<Product>>;

    /// Find product by exact name (duplicate check on create)
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>>;

    /// Insert a new product
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    /// Apply a patch; `last_updated` is always stamped
    async fn update(&self, product_id: &str, patch: ProductPatch) -> AppResult<Product>;

    /// Delete a product
    async fn delete(&self, product_id: &str) -> AppResult<()>;

    /// All products, most recently updated first
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// Products in a category, name order
    async fn list_by_category(&self, category: &str) -> AppResult<Vec<Product>>;

    /// Products at a quality level, best score first
    async fn list_by_quality_level(&self, level: QualityLevel) -> AppResult<Vec<Product>>;

    /// Excellent and good products by descending score
    async fn featured(&self, limit: u64) -> AppResult<Vec<Product>>;

    /// Case-insensitive substring search over name, description and farmer
    async fn search(&self, term: &str) -> AppResult<Vec<Product>>;

    /// Aggregate catalog counts
    async fn statistics(&self) -> AppResult<CatalogStatistics>;
}

/// SeaORM-backed catalog repository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require(&self, product_id: &str) -> AppResult<product::Model> {
        ProductEntity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[derive(FromQueryResult)]
struct CatalogStatsRow {
    total: i64,
    in_stock: i64,
    out_of_stock: i64,
    excellent: i64,
    good: i64,
    fair: i64,
    poor: i64,
    avg_quality_score: f64,
    avg_price: f64,
    total_stock: i64,
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_product_id(&self, product_id: &str) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Product::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Product::from))
    }

    async fn create(&self, new: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let active_model = product::ActiveModel {
            product_id: Set(new.product_id),
            name: Set(new.name),
            category: Set(new.category),
            price: Set(new.price),
            quality_score: Set(new.quality_score),
            quality_level: Set(new.quality_level.to_string()),
            description: Set(new.description),
            health_benefits: Set(Some(serde_json::json!(new.health_benefits))),
            best_uses: Set(Some(serde_json::json!(new.best_uses))),
            image: Set(new.image),
            farmer: Set(new.farmer),
            harvest_date: Set(new.harvest_date),
            expiry_date: Set(new.expiry_date),
            quality_assessment_date: Set(new.quality_assessment_date),
            stock: Set(new.stock),
            location: Set(new.location),
            certifications: Set(Some(serde_json::json!(new.certifications))),
            inventory_metrics: Set(Some(new.inventory_metrics)),
            created_at: Set(now),
            last_updated: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn update(&self, product_id: &str, patch: ProductPatch) -> AppResult<Product> {
        let mut active: product::ActiveModel = self.require(product_id).await?.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(score) = patch.quality_score {
            active.quality_score = Set(score);
        }
        if let Some(level) = patch.quality_level {
            active.quality_level = Set(level.to_string());
        }
        if let Some(assessed_at) = patch.quality_assessment_date {
            active.quality_assessment_date = Set(Some(assessed_at));
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(health_benefits) = patch.health_benefits {
            active.health_benefits = Set(Some(serde_json::json!(health_benefits)));
        }
        if let Some(best_uses) = patch.best_uses {
            active.best_uses = Set(Some(serde_json::json!(best_uses)));
        }
        if let Some(image) = patch.image {
            active.image = Set(Some(image));
        }
        if let Some(farmer) = patch.farmer {
            active.farmer = Set(Some(farmer));
        }
        if let Some(harvest_date) = patch.harvest_date {
            active.harvest_date = Set(harvest_date);
        }
        if let Some(expiry_date) = patch.expiry_date {
            active.expiry_date = Set(expiry_date);
        }
        if let Some(stock) = patch.stock {
            active.stock = Set(stock);
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(certifications) = patch.certifications {
            active.certifications = Set(Some(serde_json::json!(certifications)));
        }
        if let Some(metrics) = patch.inventory_metrics {
            active.inventory_metrics = Set(Some(metrics));
        }
        active.last_updated = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn delete(&self, product_id: &str) -> AppResult<()> {
        let result = ProductEntity::delete_many()
            .filter(product::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_desc(product::Column::LastUpdated)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Category.eq(category))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_by_quality_level(&self, level: QualityLevel) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::QualityLevel.eq(level.to_string()))
            .order_by_desc(product::Column::QualityScore)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn featured(&self, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(
                product::Column::QualityLevel.is_in([
                    QualityLevel::Excellent.to_string(),
                    QualityLevel::Good.to_string(),
                ]),
            )
            .order_by_desc(product::Column::QualityScore)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        let pattern = format!("%{}%", term);
        let models = ProductEntity::find()
            .filter(
                Condition::any()
                    .add(Expr::col(product::Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(product::Column::Description).ilike(pattern.clone()))
                    .add(Expr::col(product::Column::Farmer).ilike(pattern)),
            )
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn statistics(&self) -> AppResult<CatalogStatistics> {
        let row = CatalogStatsRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT
                COUNT(*)::BIGINT AS total,
                COUNT(*) FILTER (WHERE stock > 0)::BIGINT AS in_stock,
                COUNT(*) FILTER (WHERE stock <= 0)::BIGINT AS out_of_stock,
                COUNT(*) FILTER (WHERE quality_level = 'excellent')::BIGINT AS excellent,
                COUNT(*) FILTER (WHERE quality_level = 'good')::BIGINT AS good,
                COUNT(*) FILTER (WHERE quality_level = 'fair')::BIGINT AS fair,
                COUNT(*) FILTER (WHERE quality_level = 'poor')::BIGINT AS poor,
                COALESCE(AVG(quality_score), 0)::DOUBLE PRECISION AS avg_quality_score,
                COALESCE(AVG(price), 0)::DOUBLE PRECISION AS avg_price,
                COALESCE(SUM(stock), 0)::BIGINT AS total_stock
            FROM products
            "#,
        ))
        .one(&self.db)
        .await?
        .ok_or_else(|| AppError::internal("Catalog statistics query returned no row"))?;

        Ok(CatalogStatistics {
            total: row.total,
            in_stock: row.in_stock,
            out_of_stock: row.out_of_stock,
            excellent: row.excellent,
            good: row.good,
            fair: row.fair,
            poor: row.poor,
            avg_quality_score: row.avg_quality_score,
            avg_price: row.avg_price,
            total_stock: row.total_stock,
        })
    }
}
