use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    entities::{
        approval, order_item, product, purchase_order, quantity_limit, receipt, supplier, unit,
        OrderStatus,
    },
    errors::ServiceError,
};

/// Requested line on a new order. A missing price falls back to the
/// product's current catalog price.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub unit_id: i64,
    pub manager_name: String,
    pub contact: Option<String>,
    pub supplier_id: i64,
    pub desired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct DecideOrder {
    pub decided_by: String,
    pub approved: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReceiveOrder {
    pub received_on: NaiveDate,
    pub quantity_received: Decimal,
    pub divergence: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub unit_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// A purchase order materialized with all of its child collections in one
/// store round-trip. Handlers never trigger further fetches.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderAggregate {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub items: Vec<order_item::Model>,
    pub approvals: Vec<approval::Model>,
    pub receipts: Vec<receipt::Model>,
}

/// List row: the order with its items (approvals and receipts are only
/// loaded on the detail view).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub items: Vec<order_item::Model>,
}

/// Subtotal of one line: price x quantity, rounded to 2 decimals.
pub fn line_subtotal(price: Decimal, quantity: Decimal) -> Decimal {
    (price * quantity).round_dp(2)
}

/// Order total: the sum of the already-rounded line subtotals, rounded to
/// 2 decimals again.
pub fn order_total(items: &[order_item::Model]) -> Decimal {
    items
        .iter()
        .map(|item| item.subtotal)
        .sum::<Decimal>()
        .round_dp(2)
}

/// Whether any line item falls outside its (unit, product) limit band.
/// Items with no matching limit row impose no constraint; the bounds are
/// inclusive. Pure function of the given snapshot.
pub fn requires_approval(
    unit_id: i64,
    items: &[order_item::Model],
    limits: &[quantity_limit::Model],
) -> bool {
    items.iter().any(|item| {
        limits
            .iter()
            .filter(|limit| limit.unit_id == unit_id && limit.product_id == item.product_id)
            .any(|limit| item.quantity < limit.min_quantity || item.quantity > limit.max_quantity)
    })
}

/// Service owning the purchase-order aggregate and its lifecycle.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a draft order with its line items and computed total.
    /// Registry lookups and inserts run in one transaction; any failure
    /// leaves no trace of the order.
    #[instrument(skip(self, input), fields(unit_id = input.unit_id, supplier_id = input.supplier_id))]
    pub async fn create_order(&self, input: NewOrder) -> Result<OrderAggregate, ServiceError> {
        // Reject malformed quantities before touching the store.
        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "quantity for product {} must be greater than zero",
                    item.product_id
                )));
            }
        }

        let txn = self.db.begin().await?;

        unit::Entity::find_by_id(input.unit_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceError(format!("unknown unit {}", input.unit_id))
            })?;
        supplier::Entity::find_by_id(input.supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceError(format!("unknown supplier {}", input.supplier_id))
            })?;

        let order = purchase_order::ActiveModel {
            created_at: Set(Utc::now()),
            unit_id: Set(input.unit_id),
            manager_name: Set(input.manager_name),
            contact: Set(input.contact),
            supplier_id: Set(input.supplier_id),
            status: Set(OrderStatus::Draft),
            desired_date: Set(input.desired_date),
            notes: Set(input.notes),
            total: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for requested in input.items {
            let prod = product::Entity::find_by_id(requested.product_id)
                .one(&txn)
                .await?;
            let prod = match prod {
                Some(p) if p.active && p.supplier_id == order.supplier_id => p,
                _ => {
                    return Err(ServiceError::ReferenceError(format!(
                        "product {} is unknown, inactive or belongs to another supplier",
                        requested.product_id
                    )))
                }
            };

            let price = requested.price.unwrap_or(prod.price);
            let item = order_item::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(prod.id),
                quantity: Set(requested.quantity),
                price: Set(price),
                subtotal: Set(line_subtotal(price, requested.quantity)),
                reason: Set(requested.reason),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        let mut active: purchase_order::ActiveModel = order.into();
        active.total = Set(order_total(&items));
        let order = active.update(&txn).await?;

        txn.commit().await?;
        info!("Order created: {} (total {})", order.id, order.total);

        Ok(OrderAggregate {
            order,
            items,
            approvals: Vec::new(),
            receipts: Vec::new(),
        })
    }

    /// Loads the fully materialized aggregate for one order.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<OrderAggregate, ServiceError> {
        let db = &*self.db;
        let order = Self::find_order(db, order_id).await?;
        Self::load_aggregate(db, order).await
    }

    /// Lists orders newest-first with optional unit/supplier/status filters
    /// and a calendar-month window when both month and year are given.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filters: OrderFilters,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let db = &*self.db;
        let mut query = purchase_order::Entity::find();
        if let Some(unit_id) = filters.unit_id {
            query = query.filter(purchase_order::Column::UnitId.eq(unit_id));
        }
        if let Some(supplier_id) = filters.supplier_id {
            query = query.filter(purchase_order::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = filters.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let (Some(month), Some(year)) = (filters.month, filters.year) {
            let (start, end) = month_range(year, month)?;
            query = query
                .filter(purchase_order::Column::CreatedAt.gte(start))
                .filter(purchase_order::Column::CreatedAt.lt(end));
        }

        let orders = query
            .order_by_desc(purchase_order::Column::CreatedAt)
            .order_by_desc(purchase_order::Column::Id)
            .all(db)
            .await?;

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<i64, Vec<order_item::Model>> = HashMap::new();
        if !order_ids.is_empty() {
            let items = order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_item::Column::Id)
                .all(db)
                .await?;
            for item in items {
                items_by_order.entry(item.order_id).or_default().push(item);
            }
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderSummary { order, items }
            })
            .collect())
    }

    /// Deletes an order together with its items, approvals and receipts.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order(&txn, order_id).await?;

        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        approval::Entity::delete_many()
            .filter(approval::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        receipt::Entity::delete_many()
            .filter(receipt::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        purchase_order::Entity::delete_by_id(order.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!("Order deleted: {order_id}");
        Ok(())
    }

    /// Submits a draft: recomputes the total, evaluates the limit table and
    /// moves the order to `PendingApproval` (any breach) or `Authorized`.
    #[instrument(skip(self))]
    pub async fn submit_order(&self, order_id: i64) -> Result<OrderAggregate, ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order(&txn, order_id).await?;
        if !order.status.can_submit() {
            return Err(ServiceError::InvalidStateTransition {
                status: order.status,
                operation: "submit",
            });
        }

        let items = order
            .find_related(order_item::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(&txn)
            .await?;
        let total = order_total(&items);

        let product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
        let limits = if product_ids.is_empty() {
            Vec::new()
        } else {
            quantity_limit::Entity::find()
                .filter(quantity_limit::Column::UnitId.eq(order.unit_id))
                .filter(quantity_limit::Column::ProductId.is_in(product_ids))
                .all(&txn)
                .await?
        };

        let next = if requires_approval(order.unit_id, &items, &limits) {
            OrderStatus::PendingApproval
        } else {
            OrderStatus::Authorized
        };

        let mut active: purchase_order::ActiveModel = order.into();
        active.total = Set(total);
        active.status = Set(next);
        let order = active.update(&txn).await?;
        txn.commit().await?;

        info!("Order {} submitted: {}", order.id, order.status);
        Self::load_aggregate(&*self.db, order).await
    }

    /// Records a manager decision. Always appends an approval row; an
    /// approval moves the order to `Authorized`, a rejection to `Rejected`.
    /// Rejected orders may be decided again (re-review).
    #[instrument(skip(self, input), fields(approved = input.approved))]
    pub async fn decide_order(
        &self,
        order_id: i64,
        input: DecideOrder,
    ) -> Result<OrderAggregate, ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order(&txn, order_id).await?;
        if !order.status.can_decide() {
            return Err(ServiceError::InvalidStateTransition {
                status: order.status,
                operation: "decide",
            });
        }

        approval::ActiveModel {
            order_id: Set(order.id),
            decided_by: Set(input.decided_by),
            approved: Set(input.approved),
            reason: Set(input.reason),
            decided_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let next = if input.approved {
            OrderStatus::Authorized
        } else {
            OrderStatus::Rejected
        };
        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(next);
        let order = active.update(&txn).await?;
        txn.commit().await?;

        info!("Order {} decided: {}", order.id, order.status);
        Self::load_aggregate(&*self.db, order).await
    }

    /// Records a delivery. The first receipt moves an authorized order to
    /// `Received`; further receipts append without changing status.
    #[instrument(skip(self, input))]
    pub async fn receive_order(
        &self,
        order_id: i64,
        input: ReceiveOrder,
    ) -> Result<OrderAggregate, ServiceError> {
        if input.quantity_received <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity_received must be greater than zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let order = Self::find_order(&txn, order_id).await?;
        if !order.status.can_receive() {
            return Err(ServiceError::InvalidStateTransition {
                status: order.status,
                operation: "receive",
            });
        }

        receipt::ActiveModel {
            order_id: Set(order.id),
            received_on: Set(input.received_on),
            quantity_received: Set(input.quantity_received),
            divergence: Set(input.divergence),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Received);
        let order = active.update(&txn).await?;
        txn.commit().await?;

        info!("Order {} receipt recorded", order.id);
        Self::load_aggregate(&*self.db, order).await
    }

    async fn find_order<C: ConnectionTrait>(
        db: &C,
        order_id: i64,
    ) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id} not found")))
    }

    async fn load_aggregate<C: ConnectionTrait>(
        db: &C,
        order: purchase_order::Model,
    ) -> Result<OrderAggregate, ServiceError> {
        let items = order
            .find_related(order_item::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?;
        let approvals = order
            .find_related(approval::Entity)
            .order_by_asc(approval::Column::Id)
            .all(db)
            .await?;
        let receipts = order
            .find_related(receipt::Entity)
            .order_by_asc(receipt::Column::Id)
            .all(db)
            .await?;
        Ok(OrderAggregate {
            order,
            items,
            approvals,
            receipts,
        })
    }
}

/// Half-open UTC range covering one calendar month.
fn month_range(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    if !(1..=12).contains(&month) {
        return Err(ServiceError::ValidationError(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid year {year}")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid year {year}")))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(product_id: i64, quantity: Decimal, price: Decimal) -> order_item::Model {
        order_item::Model {
            id: 0,
            order_id: 1,
            product_id,
            quantity,
            price,
            subtotal: line_subtotal(price, quantity),
            reason: None,
        }
    }

    fn limit(unit_id: i64, product_id: i64, min: Decimal, max: Decimal) -> quantity_limit::Model {
        quantity_limit::Model {
            id: 0,
            unit_id,
            product_id,
            min_quantity: min,
            max_quantity: max,
        }
    }

    #[test]
    fn subtotal_rounds_to_two_decimals() {
        assert_eq!(line_subtotal(dec!(3.333), dec!(3)), dec!(10.00));
        assert_eq!(line_subtotal(dec!(0.105), dec!(1)), dec!(0.10));
        assert_eq!(line_subtotal(dec!(4.50), dec!(5)), dec!(22.50));
    }

    #[test]
    fn total_is_rounded_sum_of_rounded_subtotals() {
        let items = vec![
            item(1, dec!(3), dec!(3.333)),
            item(2, dec!(2), dec!(1.005)),
        ];
        // 9.999 -> 10.00, 2.010 -> 2.01
        assert_eq!(order_total(&items), dec!(12.01));
        assert_eq!(order_total(&[]), dec!(0));
    }

    #[test]
    fn no_matching_limit_rows_means_no_approval() {
        let items = vec![item(1, dec!(500), dec!(1))];
        assert!(!requires_approval(7, &items, &[]));
        // Limit for another unit or product does not constrain.
        let limits = vec![limit(8, 1, dec!(2), dec!(10)), limit(7, 2, dec!(2), dec!(10))];
        assert!(!requires_approval(7, &items, &limits));
    }

    #[test]
    fn breach_on_either_bound_triggers_approval() {
        let limits = vec![limit(7, 1, dec!(2), dec!(10))];
        assert!(requires_approval(7, &[item(1, dec!(1), dec!(1))], &limits));
        assert!(requires_approval(7, &[item(1, dec!(11), dec!(1))], &limits));
    }

    #[test]
    fn bounds_are_inclusive() {
        let limits = vec![limit(7, 1, dec!(2), dec!(10))];
        assert!(!requires_approval(7, &[item(1, dec!(2), dec!(1))], &limits));
        assert!(!requires_approval(7, &[item(1, dec!(10), dec!(1))], &limits));
        assert!(!requires_approval(7, &[item(1, dec!(5), dec!(1))], &limits));
    }

    #[test]
    fn one_breaching_item_flags_the_whole_order() {
        let limits = vec![limit(7, 1, dec!(2), dec!(10)), limit(7, 2, dec!(2), dec!(10))];
        let items = vec![item(1, dec!(5), dec!(1)), item(2, dec!(1), dec!(1))];
        assert!(requires_approval(7, &items, &limits));

        let items_ok = vec![item(1, dec!(5), dec!(1)), item(2, dec!(5), dec!(1))];
        assert!(!requires_approval(7, &items_ok, &limits));
    }

    #[test]
    fn month_range_handles_december_rollover() {
        let (start, end) = month_range(2025, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert!(month_range(2025, 13).is_err());
        assert!(month_range(2025, 0).is_err());
    }
}
