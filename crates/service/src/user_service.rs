use uuid::Uuid;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use models::user;
use crate::{errors::ServiceError, pagination::Pagination};
use common::pagination::total_pages;

/// Partial update of a staff user's display name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserNameUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<user::Model>,
    pub page: u64,
    pub total_pages: u64,
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "user"))
}

/// Update a user's first and/or last name.
pub async fn update_user_name(db: &DatabaseConnection, id: Uuid, input: UserNameUpdate) -> Result<user::Model, ServiceError> {
    if let Some(first) = input.first_name.as_deref() {
        user::validate_name("first_name", first)?;
    }
    if let Some(last) = input.last_name.as_deref() {
        user::validate_name("last_name", last)?;
    }
    let mut am: user::ActiveModel = get_user(db, id).await?.into();
    if let Some(first) = input.first_name {
        am.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = input.last_name {
        am.last_name = Set(last.trim().to_string());
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Hard-delete a user; credentials cascade.
pub async fn delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    if user::hard_delete(db, id).await? == 0 {
        return Err(ServiceError::not_found("id", "user"));
    }
    Ok(())
}

/// List users ordered by username.
pub async fn list_users(db: &DatabaseConnection, opts: Pagination) -> Result<UserPage, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let paginator = user::Entity::find()
        .order_by_asc(user::Column::Username)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let users = paginator.fetch_page(page_idx).await?;
    Ok(UserPage { users, page: page_idx + 1, total_pages: total_pages(total, per_page) })
}
