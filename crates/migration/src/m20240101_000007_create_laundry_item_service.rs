//! Create `laundry_item_service` composition table.
//!
//! Composite key (service_id, item_id); rows cascade with their order and
//! block deletion of the catalog item they reference.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LaundryItemService::Table)
                    .if_not_exists()
                    .col(uuid(LaundryItemService::ServiceId).not_null())
                    .col(uuid(LaundryItemService::ItemId).not_null())
                    .col(integer(LaundryItemService::Quantity).not_null())
                    .col(text(LaundryItemService::Observation).not_null().default(""))
                    .primary_key(
                        Index::create()
                            .col(LaundryItemService::ServiceId)
                            .col(LaundryItemService::ItemId),
                    )
                    .check(Expr::col(LaundryItemService::Quantity).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_service_service")
                            .from(LaundryItemService::Table, LaundryItemService::ServiceId)
                            .to(LaundryService::Table, LaundryService::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_service_item")
                            .from(LaundryItemService::Table, LaundryItemService::ItemId)
                            .to(LaundryItem::Table, LaundryItem::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LaundryItemService::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LaundryItemService { Table, ServiceId, ItemId, Quantity, Observation }

#[derive(DeriveIden)]
enum LaundryService { Table, Id }

#[derive(DeriveIden)]
enum LaundryItem { Table, Id }
