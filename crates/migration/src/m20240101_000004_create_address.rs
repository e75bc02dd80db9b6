//! Create `address` table, one row per client.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Address::Table)
                    .if_not_exists()
                    .col(uuid(Address::Id).primary_key())
                    .col(uuid(Address::ClientId).unique_key().not_null())
                    .col(string_len(Address::Street, 255).not_null())
                    .col(string_len(Address::City, 100).not_null())
                    .col(string_len(Address::State, 100).not_null())
                    .col(string_len(Address::PostalCode, 20).not_null())
                    .col(string_len(Address::Number, 20).not_null())
                    .col(ColumnDef::new(Address::Complement).string_len(255).null())
                    .col(ColumnDef::new(Address::Landmark).string_len(255).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_client")
                            .from(Address::Table, Address::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Address::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Address { Table, Id, ClientId, Street, City, State, PostalCode, Number, Complement, Landmark }

#[derive(DeriveIden)]
enum Client { Table, Id }
