//! Service order and composition endpoints. Price-affecting writes reprice the order.

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{laundry_item_service, laundry_service};
use service::composition::{self, ItemLine};
use service::lifecycle::{NewOrder, OrderUpdate};
use service::order_service::{self, OrderDetail, OrderListQuery, OrderPage};

use crate::errors::{ApiError, ApiJson};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    #[serde(default)]
    pub items: Vec<ItemLine>,
}

#[derive(Debug, Serialize)]
pub struct AddItemsResponse {
    pub items: Vec<ItemLine>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub item_quantity: i32,
}

#[utoipa::path(post, path = "/services", tag = "services", request_body = crate::openapi::NewOrderRequest, responses((status = 201, description = "Created with computed total_price"), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<NewOrder>) -> Result<(StatusCode, Json<laundry_service::Model>), ApiError> {
    let created = order_service::create_order(&state.db, input, &state.pricing).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/services", tag = "services", params(("page" = Option<u64>, Query, description = "1-based page"), ("page_size" = Option<u64>, Query, description = "page size"), ("search_term" = Option<String>, Query, description = "client name filter"), ("status" = Option<String>, Query, description = "status filter")), responses((status = 200, description = "Newest first"), (status = 400, description = "Unknown status")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<OrderListQuery>) -> Result<Json<OrderPage>, ApiError> {
    Ok(Json(order_service::list_orders(&state.db, q).await?))
}

#[utoipa::path(get, path = "/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "Order with items and client"), (status = 404, description = "Not Found")))]
pub async fn show(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>, ApiError> {
    Ok(Json(order_service::get_order(&state.db, id).await?))
}

#[utoipa::path(get, path = "/services/client/{id}", tag = "services", params(("id" = Uuid, Path, description = "client id"), ("page" = Option<u64>, Query, description = "1-based page"), ("page_size" = Option<u64>, Query, description = "page size"), ("status" = Option<String>, Query, description = "status filter")), responses((status = 200, description = "Client's orders, newest first"), (status = 404, description = "Client not found")))]
pub async fn list_by_client(State(state): State<ServerState>, Path(id): Path<Uuid>, Query(q): Query<OrderListQuery>) -> Result<Json<OrderPage>, ApiError> {
    Ok(Json(order_service::list_orders_by_client(&state.db, id, q).await?))
}

#[utoipa::path(put, path = "/services/{id}", tag = "services", request_body = crate::openapi::OrderUpdateRequest, params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "Updated and repriced"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(input): ApiJson<OrderUpdate>) -> Result<Json<laundry_service::Model>, ApiError> {
    Ok(Json(order_service::update_order(&state.db, id, input, &state.pricing).await?))
}

#[utoipa::path(delete, path = "/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "service id")), responses((status = 204, description = "Deleted with its items"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    order_service::delete_order(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/services/{id}/items", tag = "composition", request_body = crate::openapi::AddItemsDoc, params(("id" = Uuid, Path, description = "service id")), responses((status = 201, description = "Items attached"), (status = 400, description = "Bad Request"), (status = 404, description = "Service not found"), (status = 409, description = "Item already attached")))]
pub async fn add_items(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(req): ApiJson<AddItemsRequest>) -> Result<(StatusCode, Json<AddItemsResponse>), ApiError> {
    let items = composition::add_items(&state.db, id, req.items, &state.pricing).await?;
    Ok((StatusCode::CREATED, Json(AddItemsResponse { items })))
}

#[utoipa::path(delete, path = "/services/{id}/items/{item_id}", tag = "composition", params(("id" = Uuid, Path, description = "service id"), ("item_id" = Uuid, Path, description = "item id")), responses((status = 204, description = "Removed (or already absent)"), (status = 404, description = "Service not found")))]
pub async fn remove_item(State(state): State<ServerState>, Path((id, item_id)): Path<(Uuid, Uuid)>) -> Result<StatusCode, ApiError> {
    composition::remove_item(&state.db, id, item_id, &state.pricing).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(patch, path = "/services/{id}/items/{item_id}", tag = "composition", request_body = crate::openapi::QuantityDoc, params(("id" = Uuid, Path, description = "service id"), ("item_id" = Uuid, Path, description = "item id")), responses((status = 200, description = "Quantity updated"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update_item_quantity(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<QuantityRequest>,
) -> Result<Json<laundry_item_service::Model>, ApiError> {
    let row = composition::update_item_quantity(&state.db, id, item_id, req.item_quantity, &state.pricing).await?;
    Ok(Json(row))
}
