use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::laundry_item;
use service::catalog_service::{self, ItemInput, ItemPage};

use crate::errors::{ApiError, ApiJson};
use crate::routes::auth::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(get, path = "/items", tag = "items", params(("page" = Option<u64>, Query, description = "1-based page"), ("limit" = Option<u64>, Query, description = "page size, 1..=100")), responses((status = 200, description = "Catalog items ordered by name")))]
pub async fn list(State(state): State<ServerState>, Query(p): Query<ListParams>) -> Result<Json<ItemPage>, ApiError> {
    Ok(Json(catalog_service::list_items(&state.db, p.page, p.limit).await?))
}

#[utoipa::path(get, path = "/items/{id}", tag = "items", params(("id" = Uuid, Path, description = "item id")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn show(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<laundry_item::Model>, ApiError> {
    Ok(Json(catalog_service::get_item(&state.db, id).await?))
}

#[utoipa::path(post, path = "/items", tag = "items", request_body = crate::openapi::ItemRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Name taken")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<ItemInput>) -> Result<(StatusCode, Json<laundry_item::Model>), ApiError> {
    let item = catalog_service::create_item(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(put, path = "/items/{id}", tag = "items", request_body = crate::openapi::ItemRequest, params(("id" = Uuid, Path, description = "item id")), responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found"), (status = 409, description = "Name taken")))]
pub async fn update(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(input): ApiJson<ItemInput>) -> Result<Json<laundry_item::Model>, ApiError> {
    Ok(Json(catalog_service::update_item(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/items/{id}", tag = "items", params(("id" = Uuid, Path, description = "item id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Item in use")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    catalog_service::delete_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
