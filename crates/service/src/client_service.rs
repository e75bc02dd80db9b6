//! Clients of the shop and their delivery address.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::total_pages;
use models::{address, client, laundry_service};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Client fields plus the address stored alongside.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(flatten)]
    pub client: client::ClientFields,
    #[serde(default)]
    pub address: address::AddressFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: client::Model,
    pub address: Option<address::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientPage {
    pub clients: Vec<client::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenewInput {
    pub renewal_date: DateTime<FixedOffset>,
}

#[instrument(skip_all)]
pub async fn create_client(db: &DatabaseConnection, input: ClientInput) -> Result<ClientDetail, ServiceError> {
    client::validate(&input.client)?;
    let txn = db.begin().await?;
    let created = client::create(&txn, &input.client).await?;
    let addr = address::create(&txn, created.id, &input.address).await?;
    txn.commit().await?;
    info!(client_id = %created.id, monthly = created.is_monthly, "client_created");
    Ok(ClientDetail { client: created, address: Some(addr) })
}

/// Replace client fields and address together.
#[instrument(skip_all, fields(client_id = %id))]
pub async fn update_client(db: &DatabaseConnection, id: Uuid, input: ClientInput) -> Result<ClientDetail, ServiceError> {
    client::validate(&input.client)?;
    let txn = db.begin().await?;
    let existing = client::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "client"))?;

    let f = &input.client;
    let mut am: client::ActiveModel = existing.into();
    am.first_name = Set(f.first_name.trim().to_string());
    am.last_name = Set(f.last_name.trim().to_string());
    am.username = Set(f.username.trim().to_string());
    am.phone = Set(f.phone.trim().to_string());
    am.is_monthly = Set(f.is_monthly);
    am.monthly_date = Set(if f.is_monthly { f.monthly_date } else { None });
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(&txn).await?;

    let addr = match address::find_by_client(&txn, id).await? {
        Some(found) => {
            let a = &input.address;
            let mut am: address::ActiveModel = found.into();
            am.street = Set(a.street.clone());
            am.city = Set(a.city.clone());
            am.state = Set(a.state.clone());
            am.postal_code = Set(a.postal_code.clone());
            am.number = Set(a.number.clone());
            am.complement = Set(a.complement.clone());
            am.landmark = Set(a.landmark.clone());
            am.update(&txn).await?
        }
        None => address::create(&txn, id, &input.address).await?,
    };
    txn.commit().await?;
    info!(client_id = %id, "client_updated");
    Ok(ClientDetail { client: updated, address: Some(addr) })
}

pub async fn get_client(db: &DatabaseConnection, id: Uuid) -> Result<ClientDetail, ServiceError> {
    let found = client::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "client"))?;
    let addr = address::find_by_client(db, id).await?;
    Ok(ClientDetail { client: found, address: addr })
}

/// Clients ordered by name; paginated only when a page is requested.
pub async fn list_clients(db: &DatabaseConnection, page: Option<u64>, limit: Option<u64>) -> Result<ClientPage, ServiceError> {
    let select = client::Entity::find()
        .order_by_asc(client::Column::FirstName)
        .order_by_asc(client::Column::LastName);
    let Some(page) = page else {
        return Ok(ClientPage { clients: select.all(db).await?, page: None, total_pages: None });
    };
    let (page_idx, per_page) = Pagination::new(Some(page), limit).normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let clients = paginator.fetch_page(page_idx).await?;
    Ok(ClientPage { clients, page: Some(page_idx + 1), total_pages: Some(total_pages(total, per_page)) })
}

/// Delete a client with no service orders; the address goes with it.
#[instrument(skip_all, fields(client_id = %id))]
pub async fn delete_client(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    client::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "client"))?;
    let orders = laundry_service::Entity::find()
        .filter(laundry_service::Column::ClientId.eq(id))
        .count(&txn)
        .await?;
    if orders > 0 {
        return Err(ServiceError::conflict("id", format!("client has {orders} service(s)")));
    }
    client::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(client_id = %id, "client_deleted");
    Ok(())
}

/// Record a monthly fee renewal and enroll the client in the monthly plan.
#[instrument(skip_all, fields(client_id = %id))]
pub async fn renew_monthly(db: &DatabaseConnection, id: Uuid, input: RenewInput) -> Result<client::Model, ServiceError> {
    let existing = client::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "client"))?;
    let mut am: client::ActiveModel = existing.into();
    am.is_monthly = Set(true);
    am.monthly_date = Set(Some(input.renewal_date));
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(db).await?;
    info!(client_id = %id, renewal_date = %input.renewal_date, "monthly_renewed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(first: &str, monthly: bool) -> ClientInput {
        ClientInput {
            client: client::ClientFields {
                first_name: first.into(),
                last_name: "Pereira".into(),
                username: format!("cli_{}", Uuid::new_v4().simple()),
                phone: "555-0199".into(),
                is_monthly: monthly,
                monthly_date: Some(Utc::now().fixed_offset()),
            },
            address: address::AddressFields { street: "Rua A".into(), city: "Recife".into(), number: "12".into(), ..Default::default() },
        }
    }

    #[tokio::test]
    async fn missing_first_name_rejected_before_store() {
        let db = DatabaseConnection::default();
        let err = create_client(&db, input("  ", false)).await.unwrap_err();
        assert_eq!(err.field_error().map(|f| f.field.as_str()), Some("first_name"));
    }

    #[test]
    fn input_accepts_flat_client_fields_with_nested_address() {
        let raw = r#"{"first_name":"Rita","last_name":"","username":"rita","phone":"1","is_monthly":false,
            "address":{"street":"S","city":"C","state":"PE","postal_code":"5","number":"1"}}"#;
        let parsed: ClientInput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.client.first_name, "Rita");
        assert_eq!(parsed.address.state, "PE");
        assert!(parsed.address.complement.is_none());
    }

    #[tokio::test]
    async fn client_lifecycle_with_address() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let created = create_client(&db, input("Joana", false)).await?;
        assert!(created.client.monthly_date.is_none());
        assert_eq!(created.address.as_ref().map(|a| a.city.as_str()), Some("Recife"));

        let mut change = input("Joana", false);
        change.address.city = "Olinda".into();
        let updated = update_client(&db, created.client.id, change).await?;
        assert_eq!(updated.address.map(|a| a.city), Some("Olinda".to_string()));

        let renewed = renew_monthly(&db, created.client.id, RenewInput { renewal_date: Utc::now().fixed_offset() }).await?;
        assert!(renewed.is_monthly);
        assert!(renewed.monthly_date.is_some());

        let shown = get_client(&db, created.client.id).await?;
        assert!(shown.address.is_some());

        delete_client(&db, created.client.id).await?;
        assert!(address::find_by_client(&db, created.client.id).await?.is_none());
        assert!(matches!(get_client(&db, created.client.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn client_with_orders_cannot_be_deleted() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let c = create_client(&db, input("Bruno", false)).await?;
        let by_weight = crate::lifecycle::NewOrder {
            client_id: c.client.id,
            is_weight: true,
            is_piece: false,
            is_monthly: false,
            weight: rust_decimal::Decimal::from(2),
            estimated_completion_date: (Utc::now() + chrono::Duration::days(2)).fixed_offset(),
            items: Vec::new(),
        };
        let order = crate::order_service::create_order(&db, by_weight, &Default::default()).await?;

        let err = delete_client(&db, c.client.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        crate::order_service::delete_order(&db, order.id).await?;
        delete_client(&db, c.client.id).await?;
        Ok(())
    }
}
