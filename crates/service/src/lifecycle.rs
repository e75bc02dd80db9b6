//! Order lifecycle validation.
//!
//! Pure checks applied before any write when a service order is created or
//! updated. Checks that need stored data (catalog items, clients) live with
//! the operations in [`crate::order_service`].

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::laundry_item_service::validate_quantity;
use models::laundry_service::OrderStatus;

use crate::composition::ItemLine;
use crate::errors::ServiceError;

/// Furthest an estimated completion date may lie in the future.
pub const MAX_ESTIMATE_DAYS: i64 = 30;

/// Decimal places kept for weights (`numeric(10,2)`).
pub const WEIGHT_SCALE: u32 = 2;

/// Weight as it will be stored.
pub fn stored_weight(weight: Decimal) -> Decimal {
    weight.round_dp(WEIGHT_SCALE)
}

/// Input for creating a service order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub client_id: Uuid,
    #[serde(default)]
    pub is_weight: bool,
    #[serde(default)]
    pub is_piece: bool,
    #[serde(default)]
    pub is_monthly: bool,
    #[serde(default)]
    pub weight: Decimal,
    pub estimated_completion_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub items: Vec<ItemLine>,
}

/// Full replacement of an order's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub estimated_completion_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_weight: bool,
    #[serde(default)]
    pub is_piece: bool,
    #[serde(default)]
    pub is_monthly: bool,
    #[serde(default)]
    pub weight: Decimal,
    pub client_id: Uuid,
}

pub fn validate_weight(is_weight: bool, weight: Decimal) -> Result<(), ServiceError> {
    // checked after rounding: 0.004 would be stored as 0.00
    if is_weight && stored_weight(weight) <= Decimal::ZERO {
        return Err(ServiceError::validation("weight", "weight must be at least 0.01 for by-weight services"));
    }
    Ok(())
}

pub fn validate_item_lines(is_piece: bool, items: &[ItemLine]) -> Result<(), ServiceError> {
    if is_piece && items.is_empty() {
        return Err(ServiceError::validation("items", "at least one item is required for by-piece services"));
    }
    for line in items {
        validate_quantity(line.item_quantity)
            .map_err(|_| ServiceError::validation("item_quantity", format!("quantity for item {} must be greater than zero", line.item_id)))?;
    }
    Ok(())
}

pub fn validate_estimate(estimated: DateTime<FixedOffset>, now: DateTime<Utc>) -> Result<(), ServiceError> {
    let estimated = estimated.with_timezone(&Utc);
    if estimated <= now {
        return Err(ServiceError::validation("estimated_completion_date", "estimated completion date must be in the future"));
    }
    if estimated > now + Duration::days(MAX_ESTIMATE_DAYS) {
        return Err(ServiceError::validation(
            "estimated_completion_date",
            format!("estimated completion date must be within {MAX_ESTIMATE_DAYS} days"),
        ));
    }
    Ok(())
}

/// Creation checks that need no stored data, in the order they are reported.
pub fn validate_new_order(input: &NewOrder, now: DateTime<Utc>) -> Result<(), ServiceError> {
    validate_estimate(input.estimated_completion_date, now)?;
    validate_weight(input.is_weight, input.weight)?;
    validate_item_lines(input.is_piece, &input.items)?;
    Ok(())
}

pub fn parse_status(status: &str) -> Result<OrderStatus, ServiceError> {
    Ok(status.parse::<OrderStatus>()?)
}

/// Update checks against the order's immutable creation time. Returns the parsed status.
pub fn validate_order_update(update: &OrderUpdate, created_at: DateTime<FixedOffset>) -> Result<OrderStatus, ServiceError> {
    let status = parse_status(&update.status)?;
    if let Some(done) = update.completed_at {
        if done < created_at {
            return Err(ServiceError::validation("completed_at", "completion date cannot be before the creation date"));
        }
    }
    if let Some(est) = update.estimated_completion_date {
        if est < created_at {
            return Err(ServiceError::validation(
                "estimated_completion_date",
                "estimated completion date cannot be before the creation date",
            ));
        }
    }
    validate_weight(update.is_weight, update.weight)?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(r: Result<impl std::fmt::Debug, ServiceError>) -> String {
        match r {
            Err(e) => e.field_error().map(|f| f.field.clone()).unwrap_or_default(),
            Ok(v) => panic!("expected error, got {v:?}"),
        }
    }

    fn new_order(now: DateTime<Utc>) -> NewOrder {
        NewOrder {
            client_id: Uuid::new_v4(),
            is_weight: false,
            is_piece: true,
            is_monthly: false,
            weight: Decimal::ZERO,
            estimated_completion_date: (now + Duration::days(2)).fixed_offset(),
            items: vec![ItemLine { item_id: Uuid::new_v4(), item_quantity: 1, observation: String::new() }],
        }
    }

    fn update(status: &str) -> OrderUpdate {
        OrderUpdate {
            status: status.into(),
            is_paid: false,
            completed_at: None,
            estimated_completion_date: None,
            is_weight: false,
            is_piece: true,
            is_monthly: false,
            weight: Decimal::ZERO,
            client_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn accepts_valid_piece_order() {
        let now = Utc::now();
        assert!(validate_new_order(&new_order(now), now).is_ok());
    }

    #[test]
    fn piece_order_without_items_rejected_on_items() {
        let now = Utc::now();
        let mut o = new_order(now);
        o.items.clear();
        assert_eq!(field_of(validate_new_order(&o, now)), "items");
    }

    #[test]
    fn zero_quantity_rejected_on_item_quantity() {
        let now = Utc::now();
        let mut o = new_order(now);
        o.items[0].item_quantity = 0;
        assert_eq!(field_of(validate_new_order(&o, now)), "item_quantity");
    }

    #[test]
    fn weight_order_needs_positive_weight() {
        let now = Utc::now();
        let mut o = new_order(now);
        o.is_piece = false;
        o.is_weight = true;
        o.weight = Decimal::ZERO;
        assert_eq!(field_of(validate_new_order(&o, now)), "weight");
        o.weight = Decimal::new(-5, 1);
        assert_eq!(field_of(validate_new_order(&o, now)), "weight");
        o.weight = Decimal::new(5, 1);
        assert!(validate_new_order(&o, now).is_ok());
    }

    #[test]
    fn weight_that_rounds_to_zero_rejected() {
        let now = Utc::now();
        let mut o = new_order(now);
        o.is_piece = false;
        o.is_weight = true;
        o.weight = Decimal::new(4, 3);
        assert_eq!(field_of(validate_new_order(&o, now)), "weight");
        o.weight = Decimal::new(6, 3);
        assert!(validate_new_order(&o, now).is_ok());
        assert_eq!(stored_weight(o.weight), Decimal::new(1, 2));

        let created = now.fixed_offset();
        let mut u = update("Washing");
        u.is_piece = false;
        u.is_weight = true;
        u.weight = Decimal::new(4, 3);
        assert_eq!(field_of(validate_order_update(&u, created)), "weight");
    }

    #[test]
    fn estimate_must_be_future_and_within_window() {
        let now = Utc::now();
        let mut o = new_order(now);
        o.estimated_completion_date = (now - Duration::hours(1)).fixed_offset();
        assert_eq!(field_of(validate_new_order(&o, now)), "estimated_completion_date");
        o.estimated_completion_date = now.fixed_offset();
        assert_eq!(field_of(validate_new_order(&o, now)), "estimated_completion_date");
        o.estimated_completion_date = (now + Duration::days(31)).fixed_offset();
        assert_eq!(field_of(validate_new_order(&o, now)), "estimated_completion_date");
        o.estimated_completion_date = (now + Duration::days(30)).fixed_offset();
        assert!(validate_new_order(&o, now).is_ok());
    }

    #[test]
    fn update_rejects_unknown_status() {
        let created = Utc::now().fixed_offset();
        assert_eq!(field_of(validate_order_update(&update("Folded"), created)), "status");
    }

    #[test]
    fn update_accepts_any_known_status_in_any_order() {
        let created = Utc::now().fixed_offset();
        assert_eq!(validate_order_update(&update("Finished"), created).unwrap(), OrderStatus::Finished);
        assert_eq!(validate_order_update(&update("Separated"), created).unwrap(), OrderStatus::Separated);
    }

    #[test]
    fn completed_before_creation_rejected() {
        let created = Utc::now().fixed_offset();
        let mut u = update("Finished");
        u.completed_at = Some(created - Duration::minutes(1));
        assert_eq!(field_of(validate_order_update(&u, created)), "completed_at");
        u.completed_at = Some(created);
        assert!(validate_order_update(&u, created).is_ok());
    }

    #[test]
    fn estimate_before_creation_rejected_on_update() {
        let created = Utc::now().fixed_offset();
        let mut u = update("Washing");
        u.estimated_completion_date = Some(created - Duration::days(1));
        assert_eq!(field_of(validate_order_update(&u, created)), "estimated_completion_date");
    }

    #[test]
    fn update_to_weight_needs_weight() {
        let created = Utc::now().fixed_offset();
        let mut u = update("Washing");
        u.is_weight = true;
        assert_eq!(field_of(validate_order_update(&u, created)), "weight");
    }
}
