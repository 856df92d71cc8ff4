use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

pub struct Migrator;

/// Money columns hold 18 digits, except on SQLite whose schema builder caps
/// decimal precision at 16.
fn money_precision(backend: DbBackend) -> u32 {
    match backend {
        DbBackend::Sqlite => 16,
        _ => 18,
    }
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_orders_table::Migration),
            Box::new(m20240101_000002_create_order_items_table::Migration),
        ]
    }
}

mod m20240101_000001_create_orders_table {
    use super::money_precision;
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::DbBackend;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(create_table(manager.get_database_backend()))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    // Aligned with entities::order Model
    pub(super) fn create_table(backend: DbBackend) -> TableCreateStatement {
        Table::create()
            .table(Orders::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Orders::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Orders::CustomerName).string().not_null())
            .col(ColumnDef::new(Orders::CustomerEmail).string().not_null())
            .col(
                ColumnDef::new(Orders::OrderDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Orders::TotalAmount)
                    .decimal_len(money_precision(backend), 2)
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Orders::Status)
                    .string_len(32)
                    .not_null()
                    .default("Pending"),
            )
            .to_owned()
    }

    #[derive(DeriveIden)]
    pub enum Orders {
        Table,
        Id,
        CustomerName,
        CustomerEmail,
        OrderDate,
        TotalAmount,
        Status,
    }
}

mod m20240101_000002_create_order_items_table {
    use super::m20240101_000001_create_orders_table::Orders;
    use super::money_precision;
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::DbBackend;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(create_table(manager.get_database_backend()))
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    pub(super) fn create_table(backend: DbBackend) -> TableCreateStatement {
        Table::create()
            .table(OrderItems::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(OrderItems::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
            .col(ColumnDef::new(OrderItems::FlowerName).string().not_null())
            .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
            .col(
                ColumnDef::new(OrderItems::UnitPrice)
                    .decimal_len(money_precision(backend), 2)
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_order_items_order_id")
                    .from(OrderItems::Table, OrderItems::OrderId)
                    .to(Orders::Table, Orders::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        FlowerName,
        Quantity,
        UnitPrice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, DbConfig};

    #[test]
    fn sqlite_money_columns_fit_sqlite_precision() {
        let orders = m20240101_000001_create_orders_table::create_table(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder);
        let items = m20240101_000002_create_order_items_table::create_table(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder);

        assert!(orders.contains("real(16, 2)"), "{orders}");
        assert!(items.contains("real(16, 2)"), "{items}");
    }

    #[test]
    fn postgres_money_columns_keep_full_precision() {
        let orders = m20240101_000001_create_orders_table::create_table(DbBackend::Postgres)
            .to_string(PostgresQueryBuilder);
        let items = m20240101_000002_create_order_items_table::create_table(DbBackend::Postgres)
            .to_string(PostgresQueryBuilder);

        assert!(orders.contains("decimal(18, 2)"), "{orders}");
        assert!(items.contains("decimal(18, 2)"), "{items}");
        assert!(items.contains("ON DELETE CASCADE"), "{items}");
    }

    #[tokio::test]
    async fn migrator_applies_and_reverts_on_sqlite() {
        let db = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();

        Migrator::up(&db, None).await.unwrap();
        assert_eq!(Migrator::get_applied_migrations(&db).await.unwrap().len(), 2);

        Migrator::down(&db, None).await.unwrap();
        assert!(Migrator::get_applied_migrations(&db).await.unwrap().is_empty());
    }
}
