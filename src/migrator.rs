use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_workflow_documents_table::Migration),
            Box::new(m20240301_000003_create_stock_movements_table::Migration),
        ]
    }
}

mod m20240301_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::TenantId).string().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(
                            ColumnDef::new(Products::Unit)
                                .string()
                                .not_null()
                                .default("pcs"),
                        )
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CostPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_tenant_id")
                        .table(Products::Table)
                        .col(Products::TenantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Stores::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Stores::TenantId).string().not_null())
                        .col(ColumnDef::new(Stores::Name).string().not_null())
                        .col(ColumnDef::new(Stores::Address).string().null())
                        .col(
                            ColumnDef::new(Stores::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stores_tenant_id")
                        .table(Stores::Table)
                        .col(Stores::TenantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        TenantId,
        Name,
        Sku,
        Unit,
        Stock,
        Price,
        CostPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Stores {
        Table,
        Id,
        TenantId,
        Name,
        Address,
        CreatedAt,
    }
}

mod m20240301_000002_create_workflow_documents_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_workflow_documents_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkflowDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkflowDocuments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkflowDocuments::TenantId).string().not_null())
                        .col(
                            ColumnDef::new(WorkflowDocuments::Kind)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkflowDocuments::Name).string().not_null())
                        .col(ColumnDef::new(WorkflowDocuments::DocType).string().null())
                        .col(
                            ColumnDef::new(WorkflowDocuments::Status)
                                .string_len(20)
                                .not_null()
                                .default("NEW"),
                        )
                        .col(ColumnDef::new(WorkflowDocuments::ShopId).uuid().null())
                        .col(ColumnDef::new(WorkflowDocuments::ShopName).string().null())
                        .col(ColumnDef::new(WorkflowDocuments::TargetShopId).uuid().null())
                        .col(
                            ColumnDef::new(WorkflowDocuments::TargetShopName)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(WorkflowDocuments::Comment).text().null())
                        .col(ColumnDef::new(WorkflowDocuments::Items).json().not_null())
                        .col(ColumnDef::new(WorkflowDocuments::Totals).json().not_null())
                        .col(
                            ColumnDef::new(WorkflowDocuments::CreatedById)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::CreatedByName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::FinishedById)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::FinishedByName)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowDocuments::FinishedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_workflow_documents_tenant_kind_created")
                        .table(WorkflowDocuments::Table)
                        .col(WorkflowDocuments::TenantId)
                        .col(WorkflowDocuments::Kind)
                        .col(WorkflowDocuments::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_workflow_documents_shop_id")
                        .table(WorkflowDocuments::Table)
                        .col(WorkflowDocuments::ShopId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkflowDocuments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WorkflowDocuments {
        Table,
        Id,
        TenantId,
        Kind,
        Name,
        DocType,
        Status,
        ShopId,
        ShopName,
        TargetShopId,
        TargetShopName,
        Comment,
        Items,
        Totals,
        CreatedById,
        CreatedByName,
        FinishedById,
        FinishedByName,
        CreatedAt,
        UpdatedAt,
        FinishedAt,
    }
}

mod m20240301_000003_create_stock_movements_table {
    use sea_orm_migration::prelude::*;

    use super::m20240301_000001_create_catalog_tables::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::TenantId).string().not_null())
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::DocumentKind)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::DocumentId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::PreviousStock)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::NewStock).integer().not_null())
                        .col(ColumnDef::new(StockMovements::Delta).integer().not_null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_product")
                                .from(StockMovements::Table, StockMovements::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_tenant_product")
                        .table(StockMovements::Table)
                        .col(StockMovements::TenantId)
                        .col(StockMovements::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockMovements {
        Table,
        Id,
        TenantId,
        ProductId,
        DocumentKind,
        DocumentId,
        PreviousStock,
        NewStock,
        Delta,
        CreatedAt,
    }
}
