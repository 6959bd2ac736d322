use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{product, quantity_limit, unit},
    errors::ServiceError,
};

#[derive(Debug, Clone)]
pub struct CreateLimit {
    pub unit_id: i64,
    pub product_id: i64,
    pub min_quantity: Decimal,
    pub max_quantity: Decimal,
}

/// Service for the per-(unit, product) order-quantity limits that drive
/// approval routing.
#[derive(Clone)]
pub struct LimitService {
    db: Arc<DbPool>,
}

impl LimitService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_limit(
        &self,
        input: CreateLimit,
    ) -> Result<quantity_limit::Model, ServiceError> {
        let db = &*self.db;

        unit::Entity::find_by_id(input.unit_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceError(format!("unknown unit {}", input.unit_id))
            })?;
        product::Entity::find_by_id(input.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceError(format!("unknown product {}", input.product_id))
            })?;

        if input.min_quantity > input.max_quantity {
            return Err(ServiceError::ValidationError(format!(
                "min_quantity {} exceeds max_quantity {}",
                input.min_quantity, input.max_quantity
            )));
        }

        let existing = quantity_limit::Entity::find()
            .filter(quantity_limit::Column::UnitId.eq(input.unit_id))
            .filter(quantity_limit::Column::ProductId.eq(input.product_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a limit for unit {} and product {} already exists",
                input.unit_id, input.product_id
            )));
        }

        let created = quantity_limit::ActiveModel {
            unit_id: Set(input.unit_id),
            product_id: Set(input.product_id),
            min_quantity: Set(input.min_quantity),
            max_quantity: Set(input.max_quantity),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            "Limit created: {} (unit {}, product {})",
            created.id, created.unit_id, created.product_id
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_limits(&self) -> Result<Vec<quantity_limit::Model>, ServiceError> {
        let limits = quantity_limit::Entity::find()
            .order_by_asc(quantity_limit::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(limits)
    }

    #[instrument(skip(self))]
    pub async fn delete_limit(&self, limit_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let limit = quantity_limit::Entity::find_by_id(limit_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("limit {limit_id} not found")))?;

        quantity_limit::Entity::delete_by_id(limit.id).exec(db).await?;
        info!("Limit deleted: {limit_id}");
        Ok(())
    }
}
