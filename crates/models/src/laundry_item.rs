use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors, laundry_item_service};

/// Catalog entry: a priced laundry item type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "laundry_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { LaundryItemService }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::LaundryItemService => Entity::has_many(laundry_item_service::Entity).into(),
        }
    }
}

impl Related<laundry_item_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::LaundryItemService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_NAME_LEN: usize = 100;

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(errors::ModelError::validation("name", "must be at most 100 characters"));
    }
    Ok(())
}

/// Decimal places kept for prices (`numeric(10,2)`).
pub const PRICE_SCALE: u32 = 2;

/// Price as it will be stored.
pub fn stored_price(price: Decimal) -> Decimal {
    price.round_dp(PRICE_SCALE)
}

/// Positive after rounding to cents.
pub fn validate_price(price: Decimal) -> Result<(), errors::ModelError> {
    if stored_price(price) <= Decimal::ZERO {
        return Err(errors::ModelError::validation("price", "must be at least 0.01"));
    }
    Ok(())
}

/// Insert without the case-insensitive uniqueness check; callers own that lookup.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str, price: Decimal) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    validate_price(price)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        price: Set(stored_price(price)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_must_be_present_and_short() {
        assert!(validate_name("Shirt").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
        assert!(validate_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(Decimal::new(1050, 2)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::from(-3)).is_err());
    }

    #[test]
    fn price_that_rounds_to_zero_rejected() {
        assert!(validate_price(Decimal::new(4, 3)).is_err());
        assert!(validate_price(Decimal::new(6, 3)).is_ok());
        assert_eq!(stored_price(Decimal::new(6, 3)), Decimal::new(1, 2));
    }

    #[test]
    fn validation_reports_field() {
        match validate_price(Decimal::ZERO) {
            Err(errors::ModelError::Validation { field, .. }) => assert_eq!(field, "price"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
