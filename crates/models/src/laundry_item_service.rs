use sea_orm::{entity::prelude::*, ConnectionTrait};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, laundry_item, laundry_service};

/// Composition row: one catalog item on one service order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "laundry_item_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: Uuid,
    pub quantity: i32,
    #[sea_orm(column_type = "Text")]
    pub observation: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    LaundryService,
    LaundryItem,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::LaundryService => Entity::belongs_to(laundry_service::Entity)
                .from(Column::ServiceId)
                .to(laundry_service::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::LaundryItem => Entity::belongs_to(laundry_item::Entity)
                .from(Column::ItemId)
                .to(laundry_item::Column::Id)
                .on_delete(ForeignKeyAction::Restrict)
                .into(),
        }
    }
}

impl Related<laundry_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::LaundryService.def() }
}

impl Related<laundry_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::LaundryItem.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_quantity(quantity: i32) -> Result<(), errors::ModelError> {
    if quantity <= 0 {
        return Err(errors::ModelError::validation("item_quantity", "quantity must be greater than zero"));
    }
    Ok(())
}

pub async fn find_for_service<C: ConnectionTrait>(db: &C, service_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ServiceId.eq(service_id))
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
    }
}
