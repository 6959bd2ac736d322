use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240801_000001_create_registry_tables::Migration),
            Box::new(m20240801_000002_create_order_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240801_000001_create_registry_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000001_create_registry_tables"
        }
    }

    #[allow(elided_lifetimes_in_paths)]
    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Units::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Units::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Units::Name).string().not_null())
                        .col(ColumnDef::new(Units::TaxId).string().null())
                        .col(ColumnDef::new(Units::CostCenter).string().null())
                        .col(
                            ColumnDef::new(Units::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Suppliers::LegalName).string().not_null())
                        .col(ColumnDef::new(Suppliers::TaxId).string().null())
                        .col(ColumnDef::new(Suppliers::OrderEmail).string().null())
                        .col(
                            ColumnDef::new(Suppliers::SlaDays)
                                .integer()
                                .not_null()
                                .default(2),
                        )
                        .to_owned(),
                )
                .await?;

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
                        .col(
                            ColumnDef::new(Products::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::UnitOfMeasure)
                                .string()
                                .not_null()
                                .default("UN"),
                        )
                        .col(ColumnDef::new(Products::SupplierId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_supplier")
                                .from(Products::Table, Products::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(QuantityLimits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QuantityLimits::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(QuantityLimits::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuantityLimits::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuantityLimits::MinQuantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(QuantityLimits::MaxQuantity)
                                .decimal()
                                .not_null()
                                .default(999999),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quantity_limits_unit")
                                .from(QuantityLimits::Table, QuantityLimits::UnitId)
                                .to(Units::Table, Units::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quantity_limits_product")
                                .from(QuantityLimits::Table, QuantityLimits::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // One limit row per (unit, product); duplicates were ambiguous
            // in earlier revisions of the schema.
            manager
                .create_index(
                    Index::create()
                        .name("idx_quantity_limits_unit_product")
                        .table(QuantityLimits::Table)
                        .col(QuantityLimits::UnitId)
                        .col(QuantityLimits::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QuantityLimits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    pub enum Units {
        Table,
        Id,
        Code,
        Name,
        TaxId,
        CostCenter,
        Active,
    }

    #[derive(Iden)]
    pub enum Suppliers {
        Table,
        Id,
        Code,
        LegalName,
        TaxId,
        OrderEmail,
        SlaDays,
    }

    #[derive(Iden)]
    pub enum Products {
        Table,
        Id,
        Code,
        Name,
        UnitOfMeasure,
        SupplierId,
        Price,
        Active,
    }

    #[derive(Iden)]
    pub enum QuantityLimits {
        Table,
        Id,
        UnitId,
        ProductId,
        MinQuantity,
        MaxQuantity,
    }
}

mod m20240801_000002_create_order_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240801_000001_create_registry_tables::{Products, Suppliers, Units};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000002_create_order_tables"
        }
    }

    #[allow(elided_lifetimes_in_paths)]
    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::ManagerName).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Contact).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Status).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::DesiredDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_unit")
                                .from(PurchaseOrders::Table, PurchaseOrders::UnitId)
                                .to(Units::Table, Units::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_supplier")
                                .from(PurchaseOrders::Table, PurchaseOrders::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_purchase_orders_created_at")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).big_integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).big_integer().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::Price).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::Subtotal).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::Reason).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Approvals::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Approvals::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Approvals::OrderId).big_integer().not_null())
                        .col(ColumnDef::new(Approvals::DecidedBy).string().not_null())
                        .col(ColumnDef::new(Approvals::Approved).boolean().not_null())
                        .col(ColumnDef::new(Approvals::Reason).string().null())
                        .col(
                            ColumnDef::new(Approvals::DecidedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_approvals_order")
                                .from(Approvals::Table, Approvals::OrderId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Receipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Receipts::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Receipts::OrderId).big_integer().not_null())
                        .col(ColumnDef::new(Receipts::ReceivedOn).date().not_null())
                        .col(
                            ColumnDef::new(Receipts::QuantityReceived)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receipts::Divergence).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receipts_order")
                                .from(Receipts::Table, Receipts::OrderId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Receipts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Approvals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    pub enum PurchaseOrders {
        Table,
        Id,
        CreatedAt,
        UnitId,
        ManagerName,
        Contact,
        SupplierId,
        Status,
        DesiredDate,
        Notes,
        Total,
    }

    #[derive(Iden)]
    pub enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        Price,
        Subtotal,
        Reason,
    }

    #[derive(Iden)]
    pub enum Approvals {
        Table,
        Id,
        OrderId,
        DecidedBy,
        Approved,
        Reason,
        DecidedAt,
    }

    #[derive(Iden)]
    pub enum Receipts {
        Table,
        Id,
        OrderId,
        ReceivedOn,
        QuantityReceived,
        Divergence,
    }
}
