use std::sync::Arc;

use axum::{extract::{Request, State}, http::StatusCode, middleware::Next, response::Response, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use models::user::Role;
use service::auth::{decode_token, domain::{Claims, LoginInput}, errors::AuthError, repo::SeaOrmAuthRepository, AuthConfig, AuthService};
use service::pricing::PricingPolicy;

use crate::errors::{ApiError, ApiJson};

pub const AUTH_COOKIE: &str = "auth_token";

pub const ADMIN: &[Role] = &[Role::Admin];
pub const STAFF: &[Role] = &[Role::Admin, Role::Client];

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cookie_secure: bool,
}

impl From<&configs::AuthConfig> for ServerAuthConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { jwt_secret: cfg.jwt_secret.clone(), token_ttl_minutes: cfg.token_ttl_minutes, cookie_secure: cfg.cookie_secure }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<DatabaseConnection>,
    pub auth: ServerAuthConfig,
    pub pricing: PricingPolicy,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository::new(Arc::clone(&self.db)));
        AuthService::new(repo, AuthConfig::new(self.auth.jwt_secret.clone(), self.auth.token_ttl_minutes))
    }
}

/// Authenticated caller, injected into request extensions by [`require_auth`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(c: Claims) -> Self { Self { id: c.uid, username: c.sub, role: c.role } }
}

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub username: String, pub role: Role, pub token: String }

#[derive(Serialize)]
pub struct AuthStatus {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, ApiJson(input): ApiJson<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let session = state.auth_service().login(input).await?;
    let user = session.user;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.auth.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    info!(user_id = %user.id, role = user.role.as_str(), "login_cookie_set");
    let out = LoginOutput { user_id: user.id, username: user.username, role: user.role, token: session.token };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    let jar = jar.remove(cookie);
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/auth/status", tag = "auth", responses((status = 200, description = "Session state"), (status = 401, description = "Invalid or expired token")))]
pub async fn status(State(state): State<ServerState>, jar: CookieJar) -> Result<Json<AuthStatus>, ApiError> {
    let Some(tok) = jar.get(AUTH_COOKIE) else {
        return Ok(Json(AuthStatus { is_authenticated: false, username: None, role: None, user_id: None }));
    };
    let claims = decode_token(&state.auth.jwt_secret, tok.value())?;
    Ok(Json(AuthStatus {
        is_authenticated: true,
        username: Some(claims.sub),
        role: Some(claims.role),
        user_id: Some(claims.uid),
    }))
}

/// Bearer header first, then the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<Option<String>, ApiError> {
    if let Some(h) = req.headers().get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(ApiError::unauthorized("invalid Authorization format (expect Bearer)")),
        };
    }
    // Cookie 回退：解析 Cookie 头获取 auth_token
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// 认证中间件：校验 JWT，成功后把 [`CurrentUser`] 注入请求扩展
/// 缺失 token 或非法、过期均返回 401
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    if req.method() == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req)? else {
        warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(ApiError::unauthorized("authentication required"));
    };
    match decode_token(&state.auth.jwt_secret, &token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser::from(claims));
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(match e {
                AuthError::TokenExpired => ApiError::unauthorized("token expired"),
                _ => ApiError::unauthorized("invalid token"),
            })
        }
    }
}

/// 角色检查中间件；需放在 [`require_auth`] 之内
///
/// ```ignore
/// Router::new()
///     .route("/items", post(items::create))
///     .route_layer(middleware::from_fn(require_role(ADMIN)));
/// ```
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, ApiError>> + Send>> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
            if !allowed.contains(&user.role) {
                warn!(user_id = %user.id, role = user.role.as_str(), path = %req.uri().path(), "role denied");
                return Err(ApiError::forbidden(format!("role {} may not access this resource", user.role.as_str())));
            }
            Ok(next.run(req).await)
        })
    }
}
