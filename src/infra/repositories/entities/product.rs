//! SeaORM entity for the `products` table.

use sea_orm::entity::prelude::*;

use crate::domain::{Product, QualityLevel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub product_id: String,
    pub name: String,
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub quality_score: i32,
    pub quality_level: String,
    pub description: Option<String>,
    pub health_benefits: Option<Json>,
    pub best_uses: Option<Json>,
    pub image: Option<String>,
    pub farmer: Option<String>,
    pub harvest_date: Option<Date>,
    pub expiry_date: Option<Date>,
    pub quality_assessment_date: Option<DateTimeUtc>,
    pub stock: i32,
    pub location: Option<String>,
    pub certifications: Option<Json>,
    pub inventory_metrics: Option<Json>,
    pub created_at: DateTimeUtc,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Decode a stored JSON column as a string array, tolerating malformed data
pub(crate) fn string_array(value: Option<Json>) -> Vec<String> {
    match value {
        Some(Json::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode a stored JSON column as an object, tolerating malformed data
pub(crate) fn json_object(value: Option<Json>) -> Json {
    match value {
        Some(v @ Json::Object(_)) => v,
        _ => Json::Object(serde_json::Map::new()),
    }
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product {
            product_id: model.product_id,
            name: model.name,
            category: model.category,
            price: model.price,
            quality_score: model.quality_score,
            quality_level: QualityLevel::from(model.quality_level.as_str()),
            description: model.description.unwrap_or_default(),
            health_benefits: string_array(model.health_benefits),
            best_uses: string_array(model.best_uses),
            image: model.image.unwrap_or_default(),
            farmer: model.farmer.unwrap_or_default(),
            harvest_date: model.harvest_date,
            expiry_date: model.expiry_date,
            quality_assessment_date: model.quality_assessment_date,
            stock: model.stock,
            location: model.location.unwrap_or_default(),
            certifications: string_array(model.certifications),
            inventory_metrics: json_object(model.inventory_metrics),
            created_at: model.created_at,
            last_updated: model.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_array_tolerates_malformed_json() {
        assert!(string_array(None).is_empty());
        assert!(string_array(Some(Json::String("not an array".into()))).is_empty());

        let parsed = string_array(Some(serde_json::json!(["organic", "local"])));
        assert_eq!(parsed, vec!["organic".to_string(), "local".to_string()]);
    }

    #[test]
    fn json_object_falls_back_to_empty() {
        assert_eq!(json_object(None), serde_json::json!({}));
        assert_eq!(
            json_object(Some(Json::Array(vec![]))),
            serde_json::json!({})
        );
    }
}
