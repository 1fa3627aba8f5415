use crate::{db::DbPool, entities::vendor, errors::ServiceError};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a vendor
#[derive(Debug, Clone)]
pub struct NewVendor {
    pub vendor_number: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a vendor; unset fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Service for managing vendors
#[derive(Clone)]
pub struct VendorService {
    db: Arc<DbPool>,
}

impl VendorService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new vendor
    #[instrument(skip(self))]
    pub async fn create_vendor(&self, input: NewVendor) -> Result<vendor::Model, ServiceError> {
        let db = &*self.db;

        let existing = vendor::Entity::find()
            .filter(vendor::Column::VendorNumber.eq(input.vendor_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Vendor number {} already exists",
                input.vendor_number
            )));
        }

        let now = Utc::now();
        let model = vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            vendor_number: Set(input.vendor_number),
            name: Set(input.name),
            contact_name: Set(input.contact_name),
            email: Set(input.email),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Vendor created: {}", model.id);
        Ok(model)
    }

    /// Gets a vendor by ID
    #[instrument(skip(self))]
    pub async fn get_vendor(&self, vendor_id: &Uuid) -> Result<Option<vendor::Model>, ServiceError> {
        let db = &*self.db;
        let vendor = vendor::Entity::find_by_id(*vendor_id).one(db).await?;
        Ok(vendor)
    }

    /// Lists vendors with pagination, ordered by name
    #[instrument(skip(self))]
    pub async fn list_vendors(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<vendor::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = vendor::Entity::find()
            .order_by_asc(vendor::Column::Name)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let vendors = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((vendors, total))
    }

    /// Updates an existing vendor
    #[instrument(skip(self))]
    pub async fn update_vendor(
        &self,
        vendor_id: &Uuid,
        patch: VendorPatch,
    ) -> Result<vendor::Model, ServiceError> {
        let db = &*self.db;

        let existing = vendor::Entity::find_by_id(*vendor_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let mut active: vendor::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(contact_name) = patch.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(email) = patch.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        Ok(model)
    }

    /// Deletes a vendor
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, vendor_id: &Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let result = vendor::Entity::delete_by_id(*vendor_id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Vendor {} not found",
                vendor_id
            )));
        }

        info!("Vendor deleted: {}", vendor_id);
        Ok(())
    }
}
