//! Migration: Create the products table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Products::ProductId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Category).string().not_null())
                    .col(
                        ColumnDef::new(Products::Price)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::QualityScore)
                            .integer()
                            .not_null()
                            .default(50),
                    )
                    .col(
                        ColumnDef::new(Products::QualityLevel)
                            .string()
                            .not_null()
                            .default("fair"),
                    )
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::HealthBenefits).json_binary().null())
                    .col(ColumnDef::new(Products::BestUses).json_binary().null())
                    .col(ColumnDef::new(Products::Image).string().null())
                    .col(ColumnDef::new(Products::Farmer).string().null())
                    .col(ColumnDef::new(Products::HarvestDate).date().null())
                    .col(ColumnDef::new(Products::ExpiryDate).date().null())
                    .col(
                        ColumnDef::new(Products::QualityAssessmentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Products::Stock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::Location).string().null())
                    .col(ColumnDef::new(Products::Certifications).json_binary().null())
                    .col(ColumnDef::new(Products::InventoryMetrics).json_binary().null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_quality_level")
                    .table(Products::Table)
                    .col(Products::QualityLevel)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    ProductId,
    Name,
    Category,
    Price,
    QualityScore,
    QualityLevel,
    Description,
    HealthBenefits,
    BestUses,
    Image,
    Farmer,
    HarvestDate,
    ExpiryDate,
    QualityAssessmentDate,
    Stock,
    Location,
    Certifications,
    InventoryMetrics,
    CreatedAt,
    LastUpdated,
}
