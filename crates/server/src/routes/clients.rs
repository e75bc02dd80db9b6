use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use uuid::Uuid;

use models::client;
use service::client_service::{self, ClientDetail, ClientInput, ClientPage, RenewInput};

use crate::errors::{ApiError, ApiJson};
use crate::routes::auth::ServerState;
use crate::routes::items::ListParams;

#[utoipa::path(post, path = "/clients", tag = "clients", request_body = crate::openapi::ClientRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<ClientInput>) -> Result<(StatusCode, Json<ClientDetail>), ApiError> {
    let created = client_service::create_client(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/clients", tag = "clients", params(("page" = Option<u64>, Query, description = "1-based page"), ("limit" = Option<u64>, Query, description = "page size")), responses((status = 200, description = "Clients ordered by name")))]
pub async fn list(State(state): State<ServerState>, Query(p): Query<ListParams>) -> Result<Json<ClientPage>, ApiError> {
    Ok(Json(client_service::list_clients(&state.db, p.page, p.limit).await?))
}

#[utoipa::path(get, path = "/clients/{id}", tag = "clients", params(("id" = Uuid, Path, description = "client id")), responses((status = 200, description = "Client with address"), (status = 404, description = "Not Found")))]
pub async fn show(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<ClientDetail>, ApiError> {
    Ok(Json(client_service::get_client(&state.db, id).await?))
}

#[utoipa::path(put, path = "/clients/{id}", tag = "clients", request_body = crate::openapi::ClientRequest, params(("id" = Uuid, Path, description = "client id")), responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(input): ApiJson<ClientInput>) -> Result<Json<ClientDetail>, ApiError> {
    Ok(Json(client_service::update_client(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/clients/{id}", tag = "clients", params(("id" = Uuid, Path, description = "client id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Client has services")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    client_service::delete_client(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(patch, path = "/clients/{id}/renew", tag = "clients", request_body = crate::openapi::RenewRequest, params(("id" = Uuid, Path, description = "client id")), responses((status = 200, description = "Monthly plan renewed"), (status = 404, description = "Not Found")))]
pub async fn renew(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(input): ApiJson<RenewInput>) -> Result<Json<client::Model>, ApiError> {
    Ok(Json(client_service::renew_monthly(&state.db, id, input).await?))
}
