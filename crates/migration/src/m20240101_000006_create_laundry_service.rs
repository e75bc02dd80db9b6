//! Create `laundry_service` table (service orders).
//!
//! `total_price` is derived by the service layer and never written by clients.
//! Clients with orders cannot be deleted (FK restrict).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LaundryService::Table)
                    .if_not_exists()
                    .col(uuid(LaundryService::Id).primary_key())
                    .col(uuid(LaundryService::ClientId).not_null())
                    .col(string_len(LaundryService::Status, 15).not_null().default("Separated"))
                    .col(boolean(LaundryService::IsWeight).not_null().default(false))
                    .col(boolean(LaundryService::IsPiece).not_null().default(false))
                    .col(boolean(LaundryService::IsMonthly).not_null().default(false))
                    .col(boolean(LaundryService::IsPaid).not_null().default(false))
                    .col(decimal_len(LaundryService::Weight, 10, 2).not_null().default(0))
                    .col(decimal_len(LaundryService::TotalPrice, 10, 2).not_null().default(0))
                    .col(timestamp_with_time_zone(LaundryService::EstimatedCompletionDate).not_null())
                    .col(
                        ColumnDef::new(LaundryService::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(LaundryService::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(LaundryService::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_laundry_service_client")
                            .from(LaundryService::Table, LaundryService::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LaundryService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LaundryService {
    Table,
    Id,
    ClientId,
    Status,
    IsWeight,
    IsPiece,
    IsMonthly,
    IsPaid,
    Weight,
    TotalPrice,
    EstimatedCompletionDate,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Client { Table, Id }
