use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use uuid::Uuid;

use models::user;
use service::auth::domain::{AuthUser, RegisterInput};
use service::pagination::Pagination;
use service::user_service::{self, UserNameUpdate, UserPage};

use crate::errors::{ApiError, ApiJson};
use crate::routes::auth::ServerState;
use crate::routes::items::ListParams;

#[utoipa::path(post, path = "/users", tag = "users", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<RegisterInput>) -> Result<(StatusCode, Json<AuthUser>), ApiError> {
    let user = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(get, path = "/users", tag = "users", params(("page" = Option<u64>, Query, description = "1-based page"), ("limit" = Option<u64>, Query, description = "page size")), responses((status = 200, description = "Staff users")))]
pub async fn list(State(state): State<ServerState>, Query(p): Query<ListParams>) -> Result<Json<UserPage>, ApiError> {
    Ok(Json(user_service::list_users(&state.db, Pagination::new(p.page, p.limit)).await?))
}

#[utoipa::path(patch, path = "/users/{id}", tag = "users", request_body = crate::openapi::UserNameRequest, params(("id" = Uuid, Path, description = "user id")), responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Path(id): Path<Uuid>, ApiJson(input): ApiJson<UserNameUpdate>) -> Result<Json<user::Model>, ApiError> {
    Ok(Json(user_service::update_user_name(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/users/{id}", tag = "users", params(("id" = Uuid, Path, description = "user id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    user_service::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
