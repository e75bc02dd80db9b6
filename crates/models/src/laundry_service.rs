use std::fmt;
use std::str::FromStr;

use sea_orm::{entity::prelude::*, ConnectionTrait};
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{client, errors, laundry_item_service};

/// Progress of a service order. New orders start as `Separated`; any value may
/// follow any other on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Separated")]
    Separated,
    #[sea_orm(string_value = "Washing")]
    Washing,
    #[sea_orm(string_value = "Drying")]
    Drying,
    #[sea_orm(string_value = "Ironing")]
    Ironing,
    #[sea_orm(string_value = "Finished")]
    Finished,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Separated,
        OrderStatus::Washing,
        OrderStatus::Drying,
        OrderStatus::Ironing,
        OrderStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Separated => "Separated",
            OrderStatus::Washing => "Washing",
            OrderStatus::Drying => "Drying",
            OrderStatus::Ironing => "Ironing",
            OrderStatus::Finished => "Finished",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self { OrderStatus::Separated }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                errors::ModelError::validation(
                    "status",
                    format!("invalid status '{s}'; expected one of Separated, Washing, Drying, Ironing, Finished"),
                )
            })
    }
}

/// One laundry job. `total_price` is maintained by the pricing engine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "laundry_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub status: OrderStatus,
    pub is_weight: bool,
    pub is_piece: bool,
    pub is_monthly: bool,
    pub is_paid: bool,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub weight: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,
    pub estimated_completion_date: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    LaundryItemService,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client::Entity)
                .from(Column::ClientId)
                .to(client::Column::Id)
                .into(),
            Relation::LaundryItemService => Entity::has_many(laundry_item_service::Entity).into(),
        }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl Related<laundry_item_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::LaundryItemService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_status() {
        for st in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(st.as_str()).unwrap(), st);
        }
    }

    #[test]
    fn rejects_unknown_status_on_status_field() {
        match OrderStatus::from_str("Folding") {
            Err(errors::ModelError::Validation { field, .. }) => assert_eq!(field, "status"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn default_is_separated() {
        assert_eq!(OrderStatus::default(), OrderStatus::Separated);
        assert_eq!(OrderStatus::Finished.to_string(), "Finished");
    }
}
