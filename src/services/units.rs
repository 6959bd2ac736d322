use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{purchase_order, unit},
    errors::ServiceError,
};

#[derive(Debug, Clone)]
pub struct CreateUnit {
    pub code: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub cost_center: Option<String>,
    pub active: bool,
}

/// Service for managing store units.
#[derive(Clone)]
pub struct UnitService {
    db: Arc<DbPool>,
}

impl UnitService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_unit(&self, input: CreateUnit) -> Result<unit::Model, ServiceError> {
        let db = &*self.db;
        let existing = unit::Entity::find()
            .filter(unit::Column::Code.eq(&input.code))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "unit code '{}' is already registered",
                input.code
            )));
        }

        let created = unit::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            tax_id: Set(input.tax_id),
            cost_center: Set(input.cost_center),
            active: Set(input.active),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Unit created: {} ({})", created.id, created.code);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_units(&self) -> Result<Vec<unit::Model>, ServiceError> {
        let units = unit::Entity::find()
            .order_by_asc(unit::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(units)
    }

    /// Deletes a unit unless purchase orders still reference it.
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, unit_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let unit = unit::Entity::find_by_id(unit_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("unit {unit_id} not found")))?;

        let has_orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::UnitId.eq(unit_id))
            .one(db)
            .await?
            .is_some();
        if has_orders {
            return Err(ServiceError::Conflict(format!(
                "unit {unit_id} has purchase orders attached"
            )));
        }

        unit::Entity::delete_by_id(unit.id).exec(db).await?;
        info!("Unit deleted: {unit_id}");
        Ok(())
    }
}
