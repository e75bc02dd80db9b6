//! Create `client` table.
//!
//! Monthly clients carry the date their flat fee was last renewed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(uuid(Client::Id).primary_key())
                    .col(string_len(Client::FirstName, 100).not_null())
                    .col(string_len(Client::LastName, 100).not_null())
                    .col(string_len(Client::Username, 100).not_null())
                    .col(string_len(Client::Phone, 32).not_null())
                    .col(boolean(Client::IsMonthly).not_null().default(false))
                    .col(
                        ColumnDef::new(Client::MonthlyDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, FirstName, LastName, Username, Phone, IsMonthly, MonthlyDate, CreatedAt, UpdatedAt }
