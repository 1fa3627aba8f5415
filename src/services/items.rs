use crate::{db::DbPool, entities::item, errors::ServiceError};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a catalog item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a catalog item; unset fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Service for managing the item catalog
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DbPool>,
}

impl ItemService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new item
    #[instrument(skip(self))]
    pub async fn create_item(&self, input: NewItem) -> Result<item::Model, ServiceError> {
        let db = &*self.db;

        let existing = item::Entity::find()
            .filter(item::Column::ItemCode.eq(input.item_code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item code {} already exists",
                input.item_code
            )));
        }

        let now = Utc::now();
        let model = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_code: Set(input.item_code),
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Item created: {}", model.id);
        Ok(model)
    }

    /// Gets an item by ID
    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: &Uuid) -> Result<Option<item::Model>, ServiceError> {
        let db = &*self.db;
        let item = item::Entity::find_by_id(*item_id).one(db).await?;
        Ok(item)
    }

    /// Lists items with pagination, ordered by item code
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<item::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = item::Entity::find()
            .order_by_asc(item::Column::ItemCode)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Updates an existing item
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        item_id: &Uuid,
        patch: ItemPatch,
    ) -> Result<item::Model, ServiceError> {
        let db = &*self.db;

        let existing = item::Entity::find_by_id(*item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let mut active: item::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        Ok(model)
    }

    /// Deletes an item
    #[instrument(skip(self))]
    pub async fn delete_item(&self, item_id: &Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let result = item::Entity::delete_by_id(*item_id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Item {} not found",
                item_id
            )));
        }

        info!("Item deleted: {}", item_id);
        Ok(())
    }
}
