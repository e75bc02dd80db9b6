//! Pricing engine for service orders.
//!
//! The total price of an order is never authored by callers; it is derived from
//! the order's billing flags, its weight and its current composition rows:
//!
//! 1. monthly orders cost nothing (the client pays a flat fee elsewhere)
//! 2. by-weight orders cost `weight × weight_rate`
//! 3. by-piece orders cost `Σ unit_price × quantity` over the composition rows
//! 4. anything else costs nothing
//!
//! [`recompute_total_price`] re-reads the persisted state and writes the new
//! total. Call it with the same transaction that performed the triggering
//! mutation so the stored total is never stale outside that transaction.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::{laundry_item, laundry_item_service, laundry_service};

use crate::errors::ServiceError;

/// Currency units charged per weight unit unless configured otherwise.
pub const DEFAULT_WEIGHT_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Tunable pricing constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingPolicy {
    pub weight_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self { Self { weight_rate: DEFAULT_WEIGHT_RATE } }
}

impl From<&configs::PricingConfig> for PricingPolicy {
    fn from(cfg: &configs::PricingConfig) -> Self { Self { weight_rate: cfg.weight_rate } }
}

/// The billing mode that actually drives the price, resolved from the three flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    Monthly,
    ByWeight,
    ByPiece,
    Unbilled,
}

impl BillingMode {
    pub fn from_flags(is_weight: bool, is_piece: bool, is_monthly: bool) -> Self {
        if is_monthly {
            BillingMode::Monthly
        } else if is_weight {
            BillingMode::ByWeight
        } else if is_piece {
            BillingMode::ByPiece
        } else {
            BillingMode::Unbilled
        }
    }

    pub fn of(order: &laundry_service::Model) -> Self {
        Self::from_flags(order.is_weight, order.is_piece, order.is_monthly)
    }
}

/// One composition row joined to its catalog price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Pure price rule. Rounded to cents.
pub fn compute_total(mode: BillingMode, weight: Decimal, lines: &[PricedLine], policy: &PricingPolicy) -> Decimal {
    let total = match mode {
        BillingMode::Monthly | BillingMode::Unbilled => Decimal::ZERO,
        BillingMode::ByWeight => weight * policy.weight_rate,
        BillingMode::ByPiece => lines.iter().map(PricedLine::subtotal).sum(),
    };
    total.round_dp(2)
}

/// Load the composition rows of an order with the current unit price of each item.
pub async fn priced_lines<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<Vec<PricedLine>, ServiceError> {
    let rows = laundry_item_service::find_for_service(conn, order_id).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.item_id).collect();
    let prices: HashMap<Uuid, Decimal> = laundry_item::Entity::find()
        .filter(laundry_item::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| (i.id, i.price))
        .collect();

    rows.iter()
        .map(|r| {
            prices
                .get(&r.item_id)
                .map(|p| PricedLine { unit_price: *p, quantity: r.quantity })
                .ok_or_else(|| ServiceError::Db(format!("composition row references missing item {}", r.item_id)))
        })
        .collect()
}

/// Recompute the order's total from persisted state and store it.
///
/// Fails with `NotFound` when the order is gone; any failure leaves the caller's
/// transaction to be rolled back.
#[instrument(skip_all, fields(order_id = %order_id))]
pub async fn recompute_total_price<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    policy: &PricingPolicy,
) -> Result<Decimal, ServiceError> {
    let order = laundry_service::find(conn, order_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("id", "service"))?;
    let mode = BillingMode::of(&order);
    let lines = match mode {
        BillingMode::ByPiece => priced_lines(conn, order_id).await?,
        _ => Vec::new(),
    };
    let total = compute_total(mode, order.weight, &lines, policy);
    debug!(?mode, lines = lines.len(), previous = %order.total_price, "price recomputed");

    let res = laundry_service::Entity::update_many()
        .col_expr(laundry_service::Column::TotalPrice, Expr::value(total))
        .col_expr(laundry_service::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(laundry_service::Column::Id.eq(order_id))
        .exec(conn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("id", "service"));
    }
    info!(order_id = %order_id, ?mode, total = %total, "total_price_updated");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::laundry_service::OrderStatus;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn line(price: i64, qty: i32) -> PricedLine {
        PricedLine { unit_price: Decimal::from(price), quantity: qty }
    }

    fn order(is_weight: bool, is_piece: bool, is_monthly: bool, weight: Decimal) -> laundry_service::Model {
        let now = Utc::now().fixed_offset();
        laundry_service::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            status: OrderStatus::Separated,
            is_weight,
            is_piece,
            is_monthly,
            is_paid: false,
            weight,
            total_price: Decimal::ZERO,
            estimated_completion_date: now + Duration::days(1),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(id: Uuid, price: i64) -> laundry_item::Model {
        let now = Utc::now().fixed_offset();
        laundry_item::Model { id, name: format!("item-{price}"), price: Decimal::from(price), created_at: now, updated_at: now }
    }

    #[test]
    fn piece_total_sums_lines() {
        let lines = [line(10, 1), line(20, 1), line(30, 1)];
        let total = compute_total(BillingMode::ByPiece, Decimal::ZERO, &lines, &PricingPolicy::default());
        assert_eq!(total, Decimal::from(60));
    }

    #[test]
    fn weight_total_ignores_lines() {
        let lines = [line(999, 3)];
        let total = compute_total(BillingMode::ByWeight, Decimal::new(50, 1), &lines, &PricingPolicy::default());
        assert_eq!(total, Decimal::from(100));
    }

    #[test]
    fn monthly_is_free_regardless_of_flags() {
        assert_eq!(BillingMode::from_flags(true, true, true), BillingMode::Monthly);
        let total = compute_total(BillingMode::Monthly, Decimal::from(7), &[line(10, 2)], &PricingPolicy::default());
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn weight_wins_over_piece_when_both_set() {
        assert_eq!(BillingMode::from_flags(true, true, false), BillingMode::ByWeight);
    }

    #[test]
    fn neither_flag_costs_nothing() {
        assert_eq!(BillingMode::from_flags(false, false, false), BillingMode::Unbilled);
        assert_eq!(compute_total(BillingMode::Unbilled, Decimal::from(3), &[line(5, 1)], &PricingPolicy::default()), Decimal::ZERO);
    }

    #[test]
    fn configured_rate_is_used() {
        let policy = PricingPolicy { weight_rate: Decimal::new(125, 1) };
        let total = compute_total(BillingMode::ByWeight, Decimal::new(15, 1), &[], &policy);
        assert_eq!(total, Decimal::new(1875, 2));
    }

    #[test]
    fn totals_are_rounded_to_cents() {
        let policy = PricingPolicy { weight_rate: Decimal::new(3333, 3) };
        let total = compute_total(BillingMode::ByWeight, Decimal::from(1), &[], &policy);
        assert_eq!(total, Decimal::new(333, 2));
    }

    #[tokio::test]
    async fn recompute_writes_piece_total() -> anyhow::Result<()> {
        let o = order(false, true, false, Decimal::ZERO);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            laundry_item_service::Model { service_id: o.id, item_id: a, quantity: 2, observation: String::new() },
            laundry_item_service::Model { service_id: o.id, item_id: b, quantity: 1, observation: String::new() },
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![o.clone()]])
            .append_query_results([rows])
            .append_query_results([vec![item(a, 20), item(b, 30)]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .into_connection();

        let total = recompute_total_price(&db, o.id, &PricingPolicy::default()).await?;
        assert_eq!(total, Decimal::from(70));

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 4);
        let update = format!("{:?}", log[3]);
        assert!(update.contains("UPDATE"));
        assert!(update.contains("total_price"));
        Ok(())
    }

    #[tokio::test]
    async fn recompute_weight_order_skips_composition() -> anyhow::Result<()> {
        let o = order(true, false, false, Decimal::new(50, 1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![o.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .into_connection();

        let total = recompute_total_price(&db, o.id, &PricingPolicy::default()).await?;
        assert_eq!(total, Decimal::from(100));
        assert_eq!(db.into_transaction_log().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn recompute_missing_order_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<laundry_service::Model>::new()])
            .into_connection();

        let err = recompute_total_price(&db, Uuid::new_v4(), &PricingPolicy::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        // no write is attempted once the order is missing
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
