//! SeaORM entity for the `users` table.

use sea_orm::entity::prelude::*;

use crate::domain::{Account, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub postcode: String,
    pub address: String,
    pub city: String,
    pub role: String,
    pub terms_accepted: bool,
    pub newsletter: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Account {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            password_hash: model.password_hash,
            postcode: model.postcode,
            address: model.address,
            city: model.city,
            role: UserRole::from(model.role.as_str()),
            terms_accepted: model.terms_accepted,
            newsletter: model.newsletter,
            is_active: model.is_active,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}
