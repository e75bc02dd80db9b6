use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{address, errors, laundry_service};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
    pub is_monthly: bool,
    pub monthly_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Address,
    LaundryService,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Address => Entity::has_one(address::Entity).into(),
            Relation::LaundryService => Entity::has_many(laundry_service::Entity).into(),
        }
    }
}

impl Related<address::Entity> for Entity {
    fn to() -> RelationDef { Relation::Address.def() }
}

impl Related<laundry_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::LaundryService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Fields accepted when creating or replacing a client.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientFields {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
    pub is_monthly: bool,
    pub monthly_date: Option<DateTimeWithTimeZone>,
}

pub fn validate(fields: &ClientFields) -> Result<(), errors::ModelError> {
    if fields.first_name.trim().is_empty() {
        return Err(errors::ModelError::validation("first_name", "must not be empty"));
    }
    if fields.first_name.chars().count() > 100 || fields.last_name.chars().count() > 100 {
        return Err(errors::ModelError::validation("first_name", "names must be at most 100 characters"));
    }
    if fields.phone.chars().count() > 32 {
        return Err(errors::ModelError::validation("phone", "must be at most 32 characters"));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, fields: &ClientFields) -> Result<Model, errors::ModelError> {
    validate(fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(fields.first_name.trim().to_string()),
        last_name: Set(fields.last_name.trim().to_string()),
        username: Set(fields.username.trim().to_string()),
        phone: Set(fields.phone.trim().to_string()),
        is_monthly: Set(fields.is_monthly),
        // a non-monthly client has no renewal date
        monthly_date: Set(if fields.is_monthly { fields.monthly_date } else { None }),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
