//! Composition table: catalog items attached to a service order.
//!
//! Each mutation runs in one transaction together with the price
//! recomputation it triggers; by-piece orders are repriced once per call.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::{laundry_item, laundry_item_service, laundry_service};

use crate::errors::ServiceError;
use crate::lifecycle::validate_item_lines;
use crate::pricing::{recompute_total_price, PricingPolicy};

/// One requested composition row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    #[serde(alias = "laundry_item_id")]
    pub item_id: Uuid,
    pub item_quantity: i32,
    #[serde(default)]
    pub observation: String,
}

fn ensure_distinct(items: &[ItemLine]) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();
    for line in items {
        if !seen.insert(line.item_id) {
            return Err(ServiceError::validation("items", format!("item {} is listed more than once", line.item_id)));
        }
    }
    Ok(())
}

/// Check every referenced catalog item exists; returns them by id.
pub(crate) async fn ensure_items_exist<C: ConnectionTrait>(
    conn: &C,
    items: &[ItemLine],
) -> Result<HashMap<Uuid, laundry_item::Model>, ServiceError> {
    if items.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<Uuid> = items.iter().map(|l| l.item_id).collect();
    let found: HashMap<Uuid, laundry_item::Model> = laundry_item::Entity::find()
        .filter(laundry_item::Column::Id.is_in(ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let missing: Vec<String> = ids.iter().filter(|id| !found.contains_key(id)).map(Uuid::to_string).collect();
    if !missing.is_empty() {
        debug!(?missing, "unknown catalog items");
        return Err(ServiceError::missing_reference("items", format!("items not found: {}", missing.join(", "))));
    }
    Ok(found)
}

pub(crate) async fn insert_lines<C: ConnectionTrait>(conn: &C, order_id: Uuid, items: &[ItemLine]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|l| laundry_item_service::ActiveModel {
        service_id: Set(order_id),
        item_id: Set(l.item_id),
        quantity: Set(l.item_quantity),
        observation: Set(l.observation.clone()),
    });
    laundry_item_service::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
        .map_err(line_insert_error)?;
    Ok(())
}

/// A concurrent add of the same (order, item) pair trips the composite key.
fn line_insert_error(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::conflict("items", "an item in the request is already part of this service")
        }
        _ => e.into(),
    }
}

async fn load_order<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<laundry_service::Model, ServiceError> {
    laundry_service::find(conn, order_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("service_id", "service"))
}

/// Attach items to an order. All rows are inserted or none are.
#[instrument(skip_all, fields(order_id = %order_id, count = items.len()))]
pub async fn add_items(
    db: &DatabaseConnection,
    order_id: Uuid,
    items: Vec<ItemLine>,
    policy: &PricingPolicy,
) -> Result<Vec<ItemLine>, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::validation("items", "at least one item is required"));
    }
    validate_item_lines(false, &items)?;
    ensure_distinct(&items)?;

    let txn = db.begin().await?;
    let order = load_order(&txn, order_id).await?;
    ensure_items_exist(&txn, &items).await?;

    let ids: Vec<Uuid> = items.iter().map(|l| l.item_id).collect();
    let existing = laundry_item_service::Entity::find()
        .filter(laundry_item_service::Column::ServiceId.eq(order_id))
        .filter(laundry_item_service::Column::ItemId.is_in(ids))
        .all(&txn)
        .await?;
    if let Some(dup) = existing.first() {
        return Err(ServiceError::conflict("items", format!("item {} is already part of this service", dup.item_id)));
    }

    insert_lines(&txn, order_id, &items).await?;
    if order.is_piece {
        recompute_total_price(&txn, order_id, policy).await?;
    }
    txn.commit().await?;
    info!(order_id = %order_id, added = items.len(), "items_added");
    Ok(items)
}

/// Detach an item from an order. Removing a row that is not there succeeds.
#[instrument(skip_all, fields(order_id = %order_id, item_id = %item_id))]
pub async fn remove_item(
    db: &DatabaseConnection,
    order_id: Uuid,
    item_id: Uuid,
    policy: &PricingPolicy,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let order = load_order(&txn, order_id).await?;
    let res = laundry_item_service::Entity::delete_many()
        .filter(laundry_item_service::Column::ServiceId.eq(order_id))
        .filter(laundry_item_service::Column::ItemId.eq(item_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        debug!("no composition row to remove");
    }
    if order.is_piece {
        recompute_total_price(&txn, order_id, policy).await?;
    }
    txn.commit().await?;
    info!(order_id = %order_id, item_id = %item_id, removed = res.rows_affected, "item_removed");
    Ok(())
}

/// Change the quantity of an item already on the order.
#[instrument(skip_all, fields(order_id = %order_id, item_id = %item_id, quantity = quantity))]
pub async fn update_item_quantity(
    db: &DatabaseConnection,
    order_id: Uuid,
    item_id: Uuid,
    quantity: i32,
    policy: &PricingPolicy,
) -> Result<laundry_item_service::Model, ServiceError> {
    laundry_item_service::validate_quantity(quantity)?;

    let txn = db.begin().await?;
    let order = load_order(&txn, order_id).await?;
    let row = laundry_item_service::Entity::find_by_id((order_id, item_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("item_id", "service item"))?;

    let mut am: laundry_item_service::ActiveModel = row.into();
    am.quantity = Set(quantity);
    let updated = am.update(&txn).await?;
    if order.is_piece {
        recompute_total_price(&txn, order_id, policy).await?;
    }
    txn.commit().await?;
    info!(order_id = %order_id, item_id = %item_id, quantity, "item_quantity_updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i32) -> ItemLine {
        ItemLine { item_id: Uuid::new_v4(), item_quantity: qty, observation: String::new() }
    }

    #[test]
    fn duplicate_items_in_one_request_rejected() {
        let a = line(1);
        let err = ensure_distinct(&[a.clone(), a]).unwrap_err();
        assert_eq!(err.field_error().unwrap().field, "items");
    }

    #[test]
    fn item_line_observation_defaults_to_empty() {
        let l: ItemLine = serde_json::from_str(r#"{"item_id":"6f1c1f38-7e1b-4a43-9a38-1d1d1d1d1d1d","item_quantity":2}"#).unwrap();
        assert_eq!(l.item_quantity, 2);
        assert!(l.observation.is_empty());
    }

    #[test]
    fn item_line_accepts_laundry_item_id() {
        let l: ItemLine =
            serde_json::from_str(r#"{"laundry_item_id":"6f1c1f38-7e1b-4a43-9a38-1d1d1d1d1d1d","item_quantity":1}"#).unwrap();
        assert_eq!(l.item_id.to_string(), "6f1c1f38-7e1b-4a43-9a38-1d1d1d1d1d1d");
    }

    #[test]
    fn other_insert_failures_stay_db_errors() {
        let err = line_insert_error(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, ServiceError::Db(_)));
    }

    #[tokio::test]
    async fn add_items_rejects_bad_quantity_before_touching_store() {
        // a disconnected handle panics on first use
        let db = DatabaseConnection::default();
        let err = add_items(&db, Uuid::new_v4(), vec![line(0)], &PricingPolicy::default()).await.unwrap_err();
        assert_eq!(err.field_error().unwrap().field, "item_quantity");
    }

    #[tokio::test]
    async fn update_quantity_rejects_zero_before_touching_store() {
        let db = DatabaseConnection::default();
        let err = update_item_quantity(&db, Uuid::new_v4(), Uuid::new_v4(), 0, &PricingPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err.field_error().unwrap().field, "item_quantity");
    }
}
