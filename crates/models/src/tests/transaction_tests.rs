use crate::{client, laundry_item, laundry_item_service, laundry_service};
use crate::laundry_service::OrderStatus;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::setup_test_db;

async fn seed_order<C: sea_orm::ConnectionTrait>(db: &C, client_id: Uuid) -> Result<laundry_service::Model> {
    let now = Utc::now();
    let m = laundry_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        status: Set(OrderStatus::Separated),
        is_weight: Set(true),
        is_piece: Set(false),
        is_monthly: Set(false),
        is_paid: Set(false),
        weight: Set(Decimal::from(3)),
        total_price: Set(Decimal::from(60)),
        estimated_completion_date: Set((now + Duration::days(1)).into()),
        completed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(m)
}

/// Rows written inside a rolled-back transaction are never visible
#[tokio::test]
async fn test_transaction_rollback_discards_order() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let c = client::create(&db, &client::ClientFields {
        first_name: "Rollback".into(),
        username: format!("rb_{}", Uuid::new_v4().simple()),
        ..Default::default()
    }).await?;

    let txn = db.begin().await?;
    let order = seed_order(&txn, c.id).await?;
    txn.rollback().await?;

    assert!(laundry_service::Entity::find_by_id(order.id).one(&db).await?.is_none());
    client::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}

/// Committed rows persist
#[tokio::test]
async fn test_transaction_commit_keeps_order() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let c = client::create(&db, &client::ClientFields {
        first_name: "Commit".into(),
        username: format!("cm_{}", Uuid::new_v4().simple()),
        ..Default::default()
    }).await?;

    let txn = db.begin().await?;
    let order = seed_order(&txn, c.id).await?;
    txn.commit().await?;

    let found = laundry_service::Entity::find_by_id(order.id).one(&db).await?.expect("committed order");
    assert_eq!(found.total_price, Decimal::from(60));

    laundry_service::Entity::delete_by_id(order.id).exec(&db).await?;
    client::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}

/// Catalog items referenced by a composition row cannot be deleted
#[tokio::test]
async fn test_item_delete_restricted_while_referenced() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let c = client::create(&db, &client::ClientFields {
        first_name: "Guard".into(),
        username: format!("gd_{}", Uuid::new_v4().simple()),
        ..Default::default()
    }).await?;
    let item = laundry_item::create(&db, &format!("Towel {}", Uuid::new_v4().simple()), Decimal::from(5)).await?;
    let order = seed_order(&db, c.id).await?;
    laundry_item_service::ActiveModel {
        service_id: Set(order.id),
        item_id: Set(item.id),
        quantity: Set(1),
        observation: Set(String::new()),
    }
    .insert(&db)
    .await?;

    assert!(laundry_item::Entity::delete_by_id(item.id).exec(&db).await.is_err());

    laundry_service::Entity::delete_by_id(order.id).exec(&db).await?;
    laundry_item::Entity::delete_by_id(item.id).exec(&db).await?;
    client::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}
