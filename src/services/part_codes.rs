use crate::{
    db::DbPool,
    entities::{item, part_code},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a part code
#[derive(Debug, Clone)]
pub struct NewPartCode {
    pub part_code_number: String,
    pub item_id: Uuid,
    pub size_name: Option<String>,
    pub colour_name: Option<String>,
    pub serial_number: Option<String>,
    pub item_make_name: Option<String>,
    pub measurement_unit: String,
}

/// Input for updating a part code; unset fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct PartCodePatch {
    pub size_name: Option<String>,
    pub colour_name: Option<String>,
    pub serial_number: Option<String>,
    pub item_make_name: Option<String>,
    pub measurement_unit: Option<String>,
}

/// Service for managing part codes
#[derive(Clone)]
pub struct PartCodeService {
    db: Arc<DbPool>,
}

impl PartCodeService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new part code. The referenced item is resolved by explicit
    /// lookup before anything is written.
    #[instrument(skip(self))]
    pub async fn create_part_code(
        &self,
        input: NewPartCode,
    ) -> Result<part_code::Model, ServiceError> {
        let db = &*self.db;

        item::Entity::find_by_id(input.item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Item {} does not exist", input.item_id))
            })?;

        let existing = part_code::Entity::find()
            .filter(part_code::Column::PartCodeNumber.eq(input.part_code_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Part code number {} already exists",
                input.part_code_number
            )));
        }

        let now = Utc::now();
        let model = part_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            part_code_number: Set(input.part_code_number),
            item_id: Set(input.item_id),
            size_name: Set(input.size_name),
            colour_name: Set(input.colour_name),
            serial_number: Set(input.serial_number),
            item_make_name: Set(input.item_make_name),
            measurement_unit: Set(input.measurement_unit),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Part code created: {}", model.id);
        Ok(model)
    }

    /// Gets a part code by ID
    #[instrument(skip(self))]
    pub async fn get_part_code(
        &self,
        part_code_id: &Uuid,
    ) -> Result<Option<part_code::Model>, ServiceError> {
        let db = &*self.db;
        let part_code = part_code::Entity::find_by_id(*part_code_id).one(db).await?;
        Ok(part_code)
    }

    /// Gets a part code by its unique number
    #[instrument(skip(self))]
    pub async fn get_part_code_by_number(
        &self,
        part_code_number: &str,
    ) -> Result<Option<part_code::Model>, ServiceError> {
        let db = &*self.db;
        let part_code = part_code::Entity::find()
            .filter(part_code::Column::PartCodeNumber.eq(part_code_number))
            .one(db)
            .await?;
        Ok(part_code)
    }

    /// Lists part codes with pagination, ordered by number
    #[instrument(skip(self))]
    pub async fn list_part_codes(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<part_code::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = part_code::Entity::find()
            .order_by_asc(part_code::Column::PartCodeNumber)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let part_codes = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((part_codes, total))
    }

    /// Updates an existing part code
    #[instrument(skip(self))]
    pub async fn update_part_code(
        &self,
        part_code_id: &Uuid,
        patch: PartCodePatch,
    ) -> Result<part_code::Model, ServiceError> {
        let db = &*self.db;

        let existing = part_code::Entity::find_by_id(*part_code_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Part code {} not found", part_code_id))
            })?;

        let mut active: part_code::ActiveModel = existing.into();
        if let Some(size_name) = patch.size_name {
            active.size_name = Set(Some(size_name));
        }
        if let Some(colour_name) = patch.colour_name {
            active.colour_name = Set(Some(colour_name));
        }
        if let Some(serial_number) = patch.serial_number {
            active.serial_number = Set(Some(serial_number));
        }
        if let Some(item_make_name) = patch.item_make_name {
            active.item_make_name = Set(Some(item_make_name));
        }
        if let Some(measurement_unit) = patch.measurement_unit {
            active.measurement_unit = Set(measurement_unit);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        Ok(model)
    }

    /// Deletes a part code
    #[instrument(skip(self))]
    pub async fn delete_part_code(&self, part_code_id: &Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let result = part_code::Entity::delete_by_id(*part_code_id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Part code {} not found",
                part_code_id
            )));
        }

        info!("Part code deleted: {}", part_code_id);
        Ok(())
    }
}
