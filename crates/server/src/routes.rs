use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod auth;
pub mod clients;
pub mod items;
pub mod services;
pub mod users;

use auth::{require_auth, require_role, ServerState, ADMIN, STAFF};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public, staff (Admin + Client) and admin routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes (health, docs, login, catalog reads)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/login", post(auth::login))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/logout", post(auth::logout))
        .route("/items", get(items::list))
        .route("/items/:id", get(items::show));

    // Order reads open to every staff role
    let staff = Router::new()
        .route("/services/:id", get(services::show))
        .route("/services/client/:id", get(services::list_by_client))
        .route_layer(middleware::from_fn(require_role(STAFF)));

    let admin = Router::new()
        .route("/items", post(items::create))
        .route("/items/:id", put(items::update).delete(items::delete))
        .route("/clients", post(clients::create).get(clients::list))
        .route("/clients/:id", get(clients::show).put(clients::update).delete(clients::delete))
        .route("/clients/:id/renew", patch(clients::renew))
        .route("/services", post(services::create).get(services::list))
        .route("/services/:id", put(services::update).delete(services::delete))
        .route("/services/:id/items", post(services::add_items))
        .route("/services/:id/items/:item_id", patch(services::update_item_quantity).delete(services::remove_item))
        .route("/users", post(users::create).get(users::list))
        .route("/users/:id", patch(users::update).delete(users::delete))
        .route_layer(middleware::from_fn(require_role(ADMIN)));

    // require_auth 位于最外层，先于角色检查执行
    let protected = staff
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Compose
    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 请求到达时打点
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
