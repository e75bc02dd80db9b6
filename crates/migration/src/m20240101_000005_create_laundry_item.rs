//! Create `laundry_item` catalog table.
//!
//! Case-insensitive name uniqueness is enforced by an expression index added last.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LaundryItem::Table)
                    .if_not_exists()
                    .col(uuid(LaundryItem::Id).primary_key())
                    .col(string_len(LaundryItem::Name, 100).not_null())
                    .col(decimal_len(LaundryItem::Price, 10, 2).not_null())
                    .col(timestamp_with_time_zone(LaundryItem::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(LaundryItem::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LaundryItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LaundryItem { Table, Id, Name, Price, CreatedAt, UpdatedAt }
