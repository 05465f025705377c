//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use cart_item::{ActiveModel as CartItemActiveModel, Entity as CartItemEntity, Model as CartItemModel};
#[allow(unused_imports)]
pub use order::{ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel};
#[allow(unused_imports)]
pub use order_item::{
    ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity, Model as OrderItemModel,
};
#[allow(unused_imports)]
pub use product::{ActiveModel as ProductActiveModel, Entity as ProductEntity, Model as ProductModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
