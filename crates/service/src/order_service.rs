//! Service order ledger: create, update, delete and read service orders.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use common::pagination::total_pages;
use models::laundry_service::OrderStatus;
use models::{address, client, laundry_item, laundry_item_service, laundry_service};

use crate::composition::{ensure_items_exist, insert_lines};
use crate::errors::ServiceError;
use crate::lifecycle::{parse_status, stored_weight, validate_new_order, validate_order_update, NewOrder, OrderUpdate};
use crate::pagination::Pagination;
use crate::pricing::{recompute_total_price, BillingMode, PricingPolicy};

/// Composition row as shown to callers, with the item's current name and price.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub item_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub item_quantity: i32,
    pub observation: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_monthly: bool,
}

impl From<&client::Model> for ClientSummary {
    fn from(c: &client::Model) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            phone: c.phone.clone(),
            is_monthly: c.is_monthly,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: laundry_service::Model,
    pub billing_mode: BillingMode,
    pub client: Option<ClientSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<address::Model>,
    pub items: Vec<OrderLineView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search_term: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub services: Vec<OrderDetail>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

/// Look up the client an order points at; an unknown id is invalid input.
async fn referenced_client<C: ConnectionTrait>(conn: &C, client_id: Uuid) -> Result<client::Model, ServiceError> {
    client::Entity::find_by_id(client_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::missing_reference("client_id", format!("client {} not found", client_id)))
}

fn ensure_monthly_client(c: &client::Model) -> Result<(), ServiceError> {
    if !c.is_monthly {
        return Err(ServiceError::validation("client_id", "client is not enrolled in the monthly plan"));
    }
    Ok(())
}

/// Create an order with its initial composition and computed price.
#[instrument(skip_all, fields(client_id = %input.client_id, is_weight = input.is_weight, is_piece = input.is_piece))]
pub async fn create_order(
    db: &DatabaseConnection,
    input: NewOrder,
    policy: &PricingPolicy,
) -> Result<laundry_service::Model, ServiceError> {
    let now = Utc::now();
    validate_new_order(&input, now)?;

    let txn = db.begin().await?;
    ensure_items_exist(&txn, &input.items).await?;
    let c = referenced_client(&txn, input.client_id).await?;
    if input.is_monthly {
        ensure_monthly_client(&c)?;
    }

    let ts = now.fixed_offset();
    let created = laundry_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(input.client_id),
        status: Set(OrderStatus::Separated),
        is_weight: Set(input.is_weight),
        is_piece: Set(input.is_piece),
        is_monthly: Set(input.is_monthly),
        is_paid: Set(false),
        weight: Set(stored_weight(input.weight)),
        total_price: Set(Decimal::ZERO),
        estimated_completion_date: Set(input.estimated_completion_date),
        completed_at: Set(None),
        created_at: Set(ts),
        updated_at: Set(ts),
    }
    .insert(&txn)
    .await?;
    insert_lines(&txn, created.id, &input.items).await?;
    let total = recompute_total_price(&txn, created.id, policy).await?;
    txn.commit().await?;

    info!(order_id = %created.id, total = %total, "service_created");
    Ok(laundry_service::Model { total_price: total, ..created })
}

/// Replace an order's mutable fields and reprice it.
#[instrument(skip_all, fields(order_id = %id, status = %input.status))]
pub async fn update_order(
    db: &DatabaseConnection,
    id: Uuid,
    input: OrderUpdate,
    policy: &PricingPolicy,
) -> Result<laundry_service::Model, ServiceError> {
    let txn = db.begin().await?;
    let existing = laundry_service::find(&txn, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "service"))?;
    let status = validate_order_update(&input, existing.created_at)?;

    let c = referenced_client(&txn, input.client_id).await?;
    if input.is_monthly {
        ensure_monthly_client(&c)?;
    }

    let estimated = input.estimated_completion_date.unwrap_or(existing.estimated_completion_date);
    let mut am: laundry_service::ActiveModel = existing.into();
    am.status = Set(status);
    am.is_paid = Set(input.is_paid);
    am.completed_at = Set(input.completed_at);
    am.estimated_completion_date = Set(estimated);
    am.is_weight = Set(input.is_weight);
    am.is_piece = Set(input.is_piece);
    am.is_monthly = Set(input.is_monthly);
    am.weight = Set(stored_weight(input.weight));
    am.client_id = Set(input.client_id);
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(&txn).await?;

    let total = recompute_total_price(&txn, id, policy).await?;
    txn.commit().await?;
    info!(order_id = %id, status = %status, total = %total, "service_updated");
    Ok(laundry_service::Model { total_price: total, ..updated })
}

/// Delete an order; its composition rows cascade.
pub async fn delete_order(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = laundry_service::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("id", "service"));
    }
    info!(order_id = %id, "service_deleted");
    Ok(())
}

/// Build detail views for a batch of orders using one query per related table.
async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<laundry_service::Model>,
    with_address: bool,
) -> Result<Vec<OrderDetail>, ServiceError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let client_ids: Vec<Uuid> = orders.iter().map(|o| o.client_id).collect();

    let rows = laundry_item_service::Entity::find()
        .filter(laundry_item_service::Column::ServiceId.is_in(order_ids))
        .all(conn)
        .await?;
    let item_ids: Vec<Uuid> = rows.iter().map(|r| r.item_id).collect();
    let items: HashMap<Uuid, laundry_item::Model> = if item_ids.is_empty() {
        HashMap::new()
    } else {
        laundry_item::Entity::find()
            .filter(laundry_item::Column::Id.is_in(item_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect()
    };
    let clients: HashMap<Uuid, client::Model> = client::Entity::find()
        .filter(client::Column::Id.is_in(client_ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let addresses: HashMap<Uuid, address::Model> = if with_address {
        address::Entity::find()
            .filter(address::Column::ClientId.is_in(client_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| (a.client_id, a))
            .collect()
    } else {
        HashMap::new()
    };

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for r in rows {
        let Some(item) = items.get(&r.item_id) else { continue };
        let subtotal = item.price * Decimal::from(r.quantity);
        lines_by_order.entry(r.service_id).or_default().push(OrderLineView {
            item_id: r.item_id,
            name: item.name.clone(),
            unit_price: item.price,
            item_quantity: r.quantity,
            observation: r.observation,
            subtotal,
        });
    }

    Ok(orders
        .into_iter()
        .map(|o| {
            let mut items = lines_by_order.remove(&o.id).unwrap_or_default();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            OrderDetail {
                billing_mode: BillingMode::of(&o),
                client: clients.get(&o.client_id).map(ClientSummary::from),
                address: addresses.get(&o.client_id).cloned(),
                items,
                order: o,
            }
        })
        .collect())
}

/// Order detail with composition rows, client and address.
pub async fn get_order(db: &DatabaseConnection, id: Uuid) -> Result<OrderDetail, ServiceError> {
    let order = laundry_service::find(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "service"))?;
    let mut details = hydrate(db, vec![order], true).await?;
    details.pop().ok_or_else(|| ServiceError::not_found("id", "service"))
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.trim().to_lowercase());
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col((client::Entity, client::Column::FirstName)))).like(pattern.clone()))
        .add(Expr::expr(Func::lower(Expr::col((client::Entity, client::Column::LastName)))).like(pattern))
}

async fn list_filtered(
    db: &DatabaseConnection,
    q: OrderListQuery,
    client_id: Option<Uuid>,
) -> Result<OrderPage, ServiceError> {
    let paging = Pagination::new(q.page, q.page_size);
    let (page_idx, per_page) = paging.normalize();
    let search_term = q.search_term.filter(|s| !s.trim().is_empty());

    let mut select = laundry_service::Entity::find();
    if let Some(status) = q.status.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(laundry_service::Column::Status.eq(parse_status(status)?));
    }
    if let Some(cid) = client_id {
        select = select.filter(laundry_service::Column::ClientId.eq(cid));
    }
    if let Some(term) = search_term.as_deref() {
        select = select
            .join(JoinType::InnerJoin, laundry_service::Relation::Client.def())
            .filter(search_condition(term));
    }

    let paginator = select
        .order_by_desc(laundry_service::Column::CreatedAt)
        .order_by_asc(laundry_service::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let orders = paginator.fetch_page(page_idx).await?;
    debug!(total, page = page_idx + 1, fetched = orders.len(), "services listed");

    Ok(OrderPage {
        services: hydrate(db, orders, false).await?,
        page: page_idx + 1,
        total_pages: total_pages(total, per_page),
        total,
        search_term,
    })
}

/// Newest-first list with optional status and client-name filters.
pub async fn list_orders(db: &DatabaseConnection, q: OrderListQuery) -> Result<OrderPage, ServiceError> {
    list_filtered(db, q, None).await
}

/// Orders of one client, newest first.
pub async fn list_orders_by_client(
    db: &DatabaseConnection,
    client_id: Uuid,
    q: OrderListQuery,
) -> Result<OrderPage, ServiceError> {
    client::Entity::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("client_id", "client"))?;
    list_filtered(db, OrderListQuery { search_term: None, ..q }, Some(client_id)).await
}
