use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

/// `role` is `Admin` or `Client`.
#[derive(ToSchema)]
pub struct RegisterRequest { pub first_name: String, pub last_name: String, pub username: String, pub password: String, pub role: String }

#[derive(ToSchema)]
pub struct UserNameRequest { pub first_name: Option<String>, pub last_name: Option<String> }

#[derive(ToSchema)]
pub struct ItemRequest { pub name: String, pub price: Decimal }

#[derive(ToSchema)]
pub struct AddressDoc {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub number: String,
    pub complement: Option<String>,
    pub landmark: Option<String>,
}

#[derive(ToSchema)]
pub struct ClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
    pub is_monthly: bool,
    pub monthly_date: Option<DateTime<FixedOffset>>,
    pub address: AddressDoc,
}

#[derive(ToSchema)]
pub struct RenewRequest { pub renewal_date: DateTime<FixedOffset> }

#[derive(ToSchema)]
pub struct ItemLineDoc { pub item_id: Uuid, pub item_quantity: i32, pub observation: Option<String> }

#[derive(ToSchema)]
pub struct NewOrderRequest {
    pub client_id: Uuid,
    pub is_weight: bool,
    pub is_piece: bool,
    pub is_monthly: bool,
    pub weight: Decimal,
    pub estimated_completion_date: DateTime<FixedOffset>,
    pub items: Vec<ItemLineDoc>,
}

/// `status` is one of `Separated`, `Washing`, `Drying`, `Ironing`, `Finished`.
#[derive(ToSchema)]
pub struct OrderUpdateRequest {
    pub status: String,
    pub is_paid: bool,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub estimated_completion_date: Option<DateTime<FixedOffset>>,
    pub is_weight: bool,
    pub is_piece: bool,
    pub is_monthly: bool,
    pub weight: Decimal,
    pub client_id: Uuid,
}

#[derive(ToSchema)]
pub struct AddItemsDoc { pub items: Vec<ItemLineDoc> }

#[derive(ToSchema)]
pub struct QuantityDoc { pub item_quantity: i32 }

#[derive(ToSchema)]
pub struct ErrorDetailDoc { pub field: String, pub message: String, pub status: u16 }

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc { pub error: String, pub details: Vec<ErrorDetailDoc> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::status,
        crate::routes::items::list,
        crate::routes::items::show,
        crate::routes::items::create,
        crate::routes::items::update,
        crate::routes::items::delete,
        crate::routes::clients::create,
        crate::routes::clients::list,
        crate::routes::clients::show,
        crate::routes::clients::update,
        crate::routes::clients::delete,
        crate::routes::clients::renew,
        crate::routes::services::create,
        crate::routes::services::list,
        crate::routes::services::show,
        crate::routes::services::list_by_client,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::add_items,
        crate::routes::services::remove_item,
        crate::routes::services::update_item_quantity,
        crate::routes::users::create,
        crate::routes::users::list,
        crate::routes::users::update,
        crate::routes::users::delete,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            RegisterRequest,
            UserNameRequest,
            ItemRequest,
            AddressDoc,
            ClientRequest,
            RenewRequest,
            ItemLineDoc,
            NewOrderRequest,
            OrderUpdateRequest,
            AddItemsDoc,
            QuantityDoc,
            ErrorDetailDoc,
            ErrorEnvelopeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "items"),
        (name = "clients"),
        (name = "services"),
        (name = "composition"),
        (name = "users")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_pricing_mutations() {
        let doc = ApiDoc::openapi();
        for path in ["/services", "/services/{id}", "/services/{id}/items", "/services/{id}/items/{item_id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
