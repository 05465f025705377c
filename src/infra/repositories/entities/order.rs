//! SeaORM entity for the `orders` table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderStatus};

use super::product::json_object;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_id: String,
    pub user_id: i32,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub delivery_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total: Decimal,
    pub delivery_method: String,
    pub payment_method: String,
    pub shipping_address: Option<Json>,
    pub payment_info: Option<Json>,
    pub special_instructions: Option<String>,
    pub estimated_delivery: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain order from a header row and its line rows.
    pub fn into_order(self, lines: Vec<super::order_item::Model>) -> Order {
        Order {
            order_id: self.order_id,
            user_id: self.user_id,
            status: OrderStatus::from(self.status.as_str()),
            subtotal: self.subtotal,
            delivery_cost: self.delivery_cost,
            tax: self.tax,
            total: self.total,
            delivery_method: self.delivery_method,
            payment_method: self.payment_method,
            shipping_address: json_object(self.shipping_address),
            payment_info: json_object(self.payment_info),
            special_instructions: self.special_instructions,
            estimated_delivery: self.estimated_delivery,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items: lines.into_iter().map(Into::into).collect(),
        }
    }
}
