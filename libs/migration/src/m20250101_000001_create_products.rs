use sea_orm_migration::{prelude::*, schema::*};

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
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string(Products::Name))
                    .col(string(Products::Category))
                    .col(string_len_null(Products::Description, 255))
                    .col(
                        decimal_len(Products::Price, 19, 2)
                            .check(Expr::col(Products::Price).gt(0)),
                    )
                    .col(
                        integer(Products::StockQuantity)
                            .check(Expr::col(Products::StockQuantity).gte(0)),
                    )
                    .col(string_null(Products::Barcode))
                    .col(boolean(Products::Active).default(false))
                    .col(boolean(Products::OnSale).default(false))
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
                    .name("idx_products_active")
                    .table(Products::Table)
                    .col(Products::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Category,
    Description,
    Price,
    StockQuantity,
    Barcode,
    Active,
    OnSale,
}
