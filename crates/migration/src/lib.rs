//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_client;
mod m20240101_000004_create_address;
mod m20240101_000005_create_laundry_item;
mod m20240101_000006_create_laundry_service;
mod m20240101_000007_create_laundry_item_service;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_client::Migration),
            Box::new(m20240101_000004_create_address::Migration),
            Box::new(m20240101_000005_create_laundry_item::Migration),
            Box::new(m20240101_000006_create_laundry_service::Migration),
            Box::new(m20240101_000007_create_laundry_item_service::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
