use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use models::user::{self, Role};
use models::user_credentials;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

/// Shares the pool handle with the router state.
pub struct SeaOrmAuthRepository {
    pub db: Arc<DatabaseConnection>,
}

impl SeaOrmAuthRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self { Self { db } }
}

fn to_credentials(c: user_credentials::Model) -> Credentials {
    Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_username(self.db.as_ref(), username).await?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, first_name: &str, last_name: &str, username: &str, role: Role) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        if user::find_by_username(&txn, username).await?.is_some() {
            return Err(AuthError::Conflict);
        }
        let created = user::create(&txn, first_name, last_name, username, role).await?;
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(created.into())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(self.db.as_ref(), user_id).await?;
        Ok(res.map(to_credentials))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(self.db.as_ref(), user_id, password_hash, &password_algorithm).await?;
        Ok(to_credentials(c))
    }
}
