use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Order lifecycle status. A closed set: serde rejects unknown values at
/// the boundary, so the core never sees an out-of-range status.
///
/// `Approved` is declared in the data model but no transition assigns it;
/// a positive decision moves the order straight to `Authorized`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "authorized")]
    Authorized,
    #[sea_orm(string_value = "received")]
    Received,
}

impl OrderStatus {
    /// Submit is only valid for drafts; a submitted order can never return
    /// to `Draft`, so the operation is inherently non-repeatable.
    pub fn can_submit(self) -> bool {
        matches!(self, OrderStatus::Draft)
    }

    /// A decision may be recorded while pending, or again while rejected
    /// (re-review path). Each decision appends its own approval row.
    pub fn can_decide(self) -> bool {
        matches!(self, OrderStatus::PendingApproval | OrderStatus::Rejected)
    }

    /// Receipts may be recorded once authorized, and repeatedly after the
    /// order is already received (partial deliveries).
    pub fn can_receive(self) -> bool {
        matches!(self, OrderStatus::Authorized | OrderStatus::Received)
    }
}

/// A purchase order placed by a unit against a single supplier. Items,
/// approvals and receipts cascade-delete with the order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub unit_id: i64,
    pub manager_name: String,
    pub contact: Option<String>,
    pub supplier_id: i64,
    pub status: OrderStatus,
    pub desired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::approval::Entity")]
    Approvals,
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn submit_only_from_draft() {
        assert!(OrderStatus::Draft.can_submit());
        for status in [
            OrderStatus::PendingApproval,
            OrderStatus::Rejected,
            OrderStatus::Approved,
            OrderStatus::Authorized,
            OrderStatus::Received,
        ] {
            assert!(!status.can_submit(), "{status} must not allow submit");
        }
    }

    #[test]
    fn decide_from_pending_or_rejected_only() {
        assert!(OrderStatus::PendingApproval.can_decide());
        assert!(OrderStatus::Rejected.can_decide());
        for status in [
            OrderStatus::Draft,
            OrderStatus::Approved,
            OrderStatus::Authorized,
            OrderStatus::Received,
        ] {
            assert!(!status.can_decide(), "{status} must not allow a decision");
        }
    }

    #[test]
    fn receive_from_authorized_and_reenterable_while_received() {
        assert!(OrderStatus::Authorized.can_receive());
        assert!(OrderStatus::Received.can_receive());
        for status in [
            OrderStatus::Draft,
            OrderStatus::PendingApproval,
            OrderStatus::Rejected,
            OrderStatus::Approved,
        ] {
            assert!(!status.can_receive(), "{status} must not allow receipts");
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"pending_approval\"");
        let back: OrderStatus = serde_json::from_str("\"authorized\"").unwrap();
        assert_eq!(back, OrderStatus::Authorized);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }
}
