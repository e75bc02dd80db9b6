use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service orders: list by client, newest first, filter by status
        manager
            .create_index(
                Index::create()
                    .name("idx_laundry_service_client")
                    .table(LaundryService::Table)
                    .col(LaundryService::ClientId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_laundry_service_created_at")
                    .table(LaundryService::Table)
                    .col(LaundryService::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_laundry_service_status")
                    .table(LaundryService::Table)
                    .col(LaundryService::Status)
                    .to_owned(),
            )
            .await?;

        // Composition: reverse lookup used by the catalog delete guard
        manager
            .create_index(
                Index::create()
                    .name("idx_item_service_item")
                    .table(LaundryItemService::Table)
                    .col(LaundryItemService::ItemId)
                    .to_owned(),
            )
            .await?;

        // Catalog: names are unique ignoring case
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uniq_laundry_item_name_ci ON laundry_item (LOWER(name))",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_laundry_service_client").table(LaundryService::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_laundry_service_created_at").table(LaundryService::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_laundry_service_status").table(LaundryService::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_item_service_item").table(LaundryItemService::Table).to_owned())
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uniq_laundry_item_name_ci")
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LaundryService { Table, ClientId, CreatedAt, Status }

#[derive(DeriveIden)]
enum LaundryItemService { Table, ItemId }
