//! Catalog of priced laundry items.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::total_pages;
use models::{laundry_item, laundry_item_service};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub items: Vec<laundry_item::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

fn validate(input: &ItemInput) -> Result<(), ServiceError> {
    laundry_item::validate_name(&input.name)?;
    laundry_item::validate_price(input.price)?;
    Ok(())
}

/// Reject a name already used by another item, ignoring case.
async fn ensure_name_free<C: ConnectionTrait>(conn: &C, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    let mut q = laundry_item::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(laundry_item::Column::Name))).eq(name.trim().to_lowercase()));
    if let Some(id) = except {
        q = q.filter(laundry_item::Column::Id.ne(id));
    }
    if q.one(conn).await?.is_some() {
        return Err(ServiceError::conflict("name", format!("an item named '{}' already exists", name.trim())));
    }
    Ok(())
}

#[instrument(skip_all, fields(name = %input.name))]
pub async fn create_item(db: &DatabaseConnection, input: ItemInput) -> Result<laundry_item::Model, ServiceError> {
    validate(&input)?;
    ensure_name_free(db, &input.name, None).await?;
    let created = laundry_item::create(db, &input.name, input.price).await?;
    info!(item_id = %created.id, price = %created.price, "item_created");
    Ok(created)
}

/// Replace name and price. Existing orders are not repriced until their next mutation.
#[instrument(skip_all, fields(item_id = %id))]
pub async fn update_item(db: &DatabaseConnection, id: Uuid, input: ItemInput) -> Result<laundry_item::Model, ServiceError> {
    validate(&input)?;
    let existing = get_item(db, id).await?;
    ensure_name_free(db, &input.name, Some(id)).await?;
    let mut am: laundry_item::ActiveModel = existing.into();
    am.name = Set(input.name.trim().to_string());
    am.price = Set(laundry_item::stored_price(input.price));
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(db).await?;
    info!(item_id = %id, price = %updated.price, "item_updated");
    Ok(updated)
}

pub async fn get_item(db: &DatabaseConnection, id: Uuid) -> Result<laundry_item::Model, ServiceError> {
    laundry_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "item"))
}

/// Delete an item that no service order references.
#[instrument(skip_all, fields(item_id = %id))]
pub async fn delete_item(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get_item(db, id).await?;
    let refs = laundry_item_service::Entity::find()
        .filter(laundry_item_service::Column::ItemId.eq(id))
        .count(db)
        .await?;
    if refs > 0 {
        return Err(ServiceError::conflict("id", format!("item is used by {refs} service(s)")));
    }
    laundry_item::Entity::delete_by_id(id).exec(db).await?;
    info!(item_id = %id, "item_deleted");
    Ok(())
}

/// Items ordered by name; paginated only when a page is requested.
pub async fn list_items(db: &DatabaseConnection, page: Option<u64>, limit: Option<u64>) -> Result<ItemPage, ServiceError> {
    let select = laundry_item::Entity::find().order_by_asc(laundry_item::Column::Name);
    let Some(page) = page else {
        return Ok(ItemPage { items: select.all(db).await?, page: None, total_pages: None });
    };
    let (page_idx, per_page) = Pagination::new(Some(page), limit).normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(ItemPage { items, page: Some(page_idx + 1), total_pages: Some(total_pages(total, per_page)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(name: &str, price: i64) -> ItemInput {
        ItemInput { name: name.into(), price: Decimal::from(price) }
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_store() {
        let db = DatabaseConnection::default();
        let err = create_item(&db, input("", 5)).await.unwrap_err();
        assert_eq!(err.field_error().map(|f| f.field.as_str()), Some("name"));
        let err = create_item(&db, input("Coat", 0)).await.unwrap_err();
        assert_eq!(err.field_error().map(|f| f.field.as_str()), Some("price"));
        let tiny = ItemInput { name: "Sock".into(), price: Decimal::new(4, 3) };
        let err = create_item(&db, tiny.clone()).await.unwrap_err();
        assert_eq!(err.field_error().map(|f| f.field.as_str()), Some("price"));
        let err = update_item(&db, Uuid::new_v4(), tiny).await.unwrap_err();
        assert_eq!(err.field_error().map(|f| f.field.as_str()), Some("price"));
    }

    #[tokio::test]
    async fn names_are_unique_ignoring_case() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let name = format!("Duvet {}", Uuid::new_v4().simple());
        let item = create_item(&db, input(&name, 40)).await?;

        let err = create_item(&db, input(&name.to_uppercase(), 41)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref f) if f.field == "name"));

        // renaming an item to its own name is allowed
        let same = update_item(&db, item.id, input(&name.to_lowercase(), 45)).await?;
        assert_eq!(same.price, Decimal::from(45));

        delete_item(&db, item.id).await?;
        assert!(matches!(get_item(&db, item.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn referenced_item_cannot_be_deleted() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let policy = crate::pricing::PricingPolicy::default();
        let c = models::client::create(&db, &models::client::ClientFields {
            first_name: "Ref".into(),
            username: format!("ref_{}", Uuid::new_v4().simple()),
            ..Default::default()
        })
        .await?;
        let item = create_item(&db, input(&format!("Rug {}", Uuid::new_v4().simple()), 60)).await?;
        let order = crate::order_service::create_order(&db, crate::lifecycle::NewOrder {
            client_id: c.id,
            is_weight: false,
            is_piece: true,
            is_monthly: false,
            weight: Decimal::ZERO,
            estimated_completion_date: (Utc::now() + chrono::Duration::days(1)).fixed_offset(),
            items: vec![crate::composition::ItemLine { item_id: item.id, item_quantity: 1, observation: String::new() }],
        }, &policy)
        .await?;

        let err = delete_item(&db, item.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref f) if f.field == "id" && f.status == 409));

        crate::order_service::delete_order(&db, order.id).await?;
        delete_item(&db, item.id).await?;
        models::client::Entity::delete_by_id(c.id).exec(&db).await?;
        Ok(())
    }
}
