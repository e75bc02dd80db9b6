use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use models::user;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_minutes: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_minutes, password_algorithm: "argon2".into() }
    }
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(cfg: &configs::AuthConfig) -> Self { Self::new(cfg.jwt_secret.clone(), cfg.token_ttl_minutes) }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new staff user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 60));
    /// let input = RegisterInput { first_name: "Ana".into(), last_name: "Lima".into(), username: "ana".into(), password: "Secret123".into(), role: Role::Admin };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "ana");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, role = input.role.as_str()))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        user::validate_name("first_name", &input.first_name)?;
        user::validate_username(&input.username)?;
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation("password", format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(&input.first_name, &input.last_name, &input.username, input.role).await?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, username = %user.username, role = user.role.as_str(), "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a signed token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 60));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { first_name: "N".into(), last_name: String::new(), username: "desk".into(), password: "Passw0rd".into(), role: Role::Client }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "desk".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "desk");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            debug!("password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let (token, expires_at) = issue_token(&self.cfg, &user)?;
        info!(user_id = %user.id, role = user.role.as_str(), "user_logged_in");
        Ok(AuthSession { user, token, expires_at })
    }
}

/// Sign an HS256 token for `user` valid for the configured ttl.
pub fn issue_token(cfg: &AuthConfig, user: &AuthUser) -> Result<(String, chrono::DateTime<Utc>), AuthError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(cfg.token_ttl_minutes);
    let claims = Claims {
        sub: user.username.clone(),
        uid: user.id,
        role: user.role,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok((token, expires_at))
}

/// Verify signature and expiry; an expired token is reported separately.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenError(e.to_string()),
        })
}
