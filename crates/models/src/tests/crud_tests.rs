use crate::{address, client, laundry_item, laundry_item_service, laundry_service, user, user_credentials};
use crate::laundry_service::OrderStatus;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::setup_test_db;

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Test staff user + credentials CRUD
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let username = unique("staff");
    let created = user::create(&db, "Ana", "Souza", &username, user::Role::Admin).await?;
    assert_eq!(created.role, user::Role::Admin);

    let found = user::find_by_username(&db, &username).await?.expect("user by username");
    assert_eq!(found.id, created.id);

    let cred = user_credentials::upsert_password(&db, created.id, "hash-1".into(), "argon2").await?;
    let again = user_credentials::upsert_password(&db, created.id, "hash-2".into(), "argon2").await?;
    assert_eq!(cred.id, again.id);
    assert_eq!(again.password_hash, "hash-2");

    // credentials cascade with the user
    assert_eq!(user::hard_delete(&db, created.id).await?, 1);
    assert!(user_credentials::find_by_user(&db, created.id).await?.is_none());
    Ok(())
}

/// Test client + address CRUD
#[tokio::test]
async fn test_client_with_address() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let fields = client::ClientFields {
        first_name: "Joana".into(),
        last_name: "Lima".into(),
        username: unique("joana"),
        phone: "+55 11 99999-0000".into(),
        is_monthly: false,
        monthly_date: Some(Utc::now().into()),
    };
    let c = client::create(&db, &fields).await?;
    // monthly_date is dropped for non-monthly clients
    assert!(c.monthly_date.is_none());

    let addr = address::create(&db, c.id, &address::AddressFields {
        street: "Rua A".into(),
        city: "Recife".into(),
        state: "PE".into(),
        postal_code: "50000-000".into(),
        number: "10".into(),
        complement: None,
        landmark: Some("near the market".into()),
    }).await?;
    assert_eq!(address::find_by_client(&db, c.id).await?.map(|a| a.id), Some(addr.id));

    client::Entity::delete_by_id(c.id).exec(&db).await?;
    assert!(address::Entity::find_by_id(addr.id).one(&db).await?.is_none());
    Ok(())
}

/// Test catalog item + order + composition row round trip
#[tokio::test]
async fn test_order_with_composition() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = client::create(&db, &client::ClientFields {
        first_name: "Caio".into(),
        username: unique("caio"),
        ..Default::default()
    }).await?;
    let shirt = laundry_item::create(&db, &unique("Shirt"), Decimal::new(1250, 2)).await?;
    assert_eq!(shirt.price, Decimal::new(1250, 2));

    let now = Utc::now();
    let order = laundry_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(c.id),
        status: Set(OrderStatus::Separated),
        is_weight: Set(false),
        is_piece: Set(true),
        is_monthly: Set(false),
        is_paid: Set(false),
        weight: Set(Decimal::ZERO),
        total_price: Set(Decimal::new(2500, 2)),
        estimated_completion_date: Set((now + Duration::days(2)).into()),
        completed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    assert_eq!(order.status, OrderStatus::Separated);

    laundry_item_service::ActiveModel {
        service_id: Set(order.id),
        item_id: Set(shirt.id),
        quantity: Set(2),
        observation: Set("collar stain".into()),
    }
    .insert(&db)
    .await?;

    let rows = laundry_item_service::find_for_service(&db, order.id).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 2);

    let by_status = laundry_service::Entity::find()
        .filter(laundry_service::Column::Status.eq(OrderStatus::Separated))
        .filter(laundry_service::Column::Id.eq(order.id))
        .one(&db)
        .await?;
    assert!(by_status.is_some());

    // composition rows cascade with the order
    laundry_service::Entity::delete_by_id(order.id).exec(&db).await?;
    assert!(laundry_item_service::find_for_service(&db, order.id).await?.is_empty());
    laundry_item::Entity::delete_by_id(shirt.id).exec(&db).await?;
    client::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}
