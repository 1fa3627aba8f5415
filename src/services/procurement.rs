use crate::{
    db::DbPool,
    entities::{
        part_code,
        purchase_order::{self, PurchaseOrderStatus, INITIAL_STATUS},
        purchase_order_item, vendor,
    },
    errors::ServiceError,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a purchase order
#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub po_number: String,
    pub vendor_id: Uuid,
    pub payment_terms: Option<String>,
    pub delivery_date: NaiveDate,
}

/// Input for updating a purchase order; unset fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderPatch {
    pub payment_terms: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

/// Input for adding a line to a purchase order.
///
/// `total_price` is taken at face value; the service does not recompute or
/// cross-check it against `quantity * unit_price`.
#[derive(Debug, Clone)]
pub struct NewPurchaseOrderItem {
    pub po_item_number: String,
    pub part_code_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Input for updating a purchase order line
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderItemPatch {
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
}

/// Checks whether a purchase order in `current` may move to `target`.
///
/// Orders start in the out-of-band "Draft" state, so Draft participates in
/// the transition table even though it is not a declared status.
fn ensure_transition(current: &str, target: PurchaseOrderStatus) -> Result<(), ServiceError> {
    let allowed = match target {
        PurchaseOrderStatus::Created => current == INITIAL_STATUS,
        PurchaseOrderStatus::Approved => {
            current == INITIAL_STATUS || current == PurchaseOrderStatus::Created.to_string()
        }
        PurchaseOrderStatus::Received => current == PurchaseOrderStatus::Approved.to_string(),
        PurchaseOrderStatus::Cancelled => {
            current != PurchaseOrderStatus::Received.to_string()
                && current != PurchaseOrderStatus::Cancelled.to_string()
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(ServiceError::InvalidOperation(format!(
            "Cannot move purchase order from {} to {}",
            current, target
        )))
    }
}

/// Service for managing purchase orders and their lines
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new purchase order in the initial "Draft" state. The vendor
    /// reference is resolved by explicit lookup before anything is written.
    #[instrument(skip(self))]
    pub async fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;

        vendor::Entity::find_by_id(input.vendor_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Vendor {} does not exist", input.vendor_id))
            })?;

        let existing = purchase_order::Entity::find()
            .filter(purchase_order::Column::PoNumber.eq(input.po_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order number {} already exists",
                input.po_number
            )));
        }

        let now = Utc::now();
        let model = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            po_number: Set(input.po_number),
            vendor_id: Set(input.vendor_id),
            payment_terms: Set(input.payment_terms),
            delivery_date: Set(input.delivery_date),
            status: Set(INITIAL_STATUS.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Purchase order created: {} ({})", model.po_number, model.id);
        Ok(model)
    }

    /// Gets a purchase order by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        po_id: &Uuid,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        let db = &*self.db;
        let po = purchase_order::Entity::find_by_id(*po_id).one(db).await?;
        Ok(po)
    }

    /// Gets a purchase order by its unique number
    #[instrument(skip(self))]
    pub async fn get_purchase_order_by_number(
        &self,
        po_number: &str,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        let db = &*self.db;
        let po = purchase_order::Entity::find()
            .filter(purchase_order::Column::PoNumber.eq(po_number))
            .one(db)
            .await?;
        Ok(po)
    }

    /// Lists purchase orders with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = purchase_order::Entity::find()
            .order_by_desc(purchase_order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((orders, total))
    }

    /// Gets purchase orders for a vendor
    #[instrument(skip(self))]
    pub async fn get_purchase_orders_by_vendor(
        &self,
        vendor_id: &Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = &*self.db;
        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::VendorId.eq(*vendor_id))
            .order_by_desc(purchase_order::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(orders)
    }

    /// Updates mutable header fields of a purchase order
    #[instrument(skip(self))]
    pub async fn update_purchase_order(
        &self,
        po_id: &Uuid,
        patch: PurchaseOrderPatch,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;

        let existing = purchase_order::Entity::find_by_id(*po_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", po_id))
            })?;

        let mut active: purchase_order::ActiveModel = existing.into();
        if let Some(payment_terms) = patch.payment_terms {
            active.payment_terms = Set(Some(payment_terms));
        }
        if let Some(delivery_date) = patch.delivery_date {
            active.delivery_date = Set(delivery_date);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        Ok(model)
    }

    /// Moves a purchase order to the given declared status
    #[instrument(skip(self))]
    pub async fn transition_purchase_order(
        &self,
        po_id: &Uuid,
        target: PurchaseOrderStatus,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;

        let existing = purchase_order::Entity::find_by_id(*po_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", po_id))
            })?;

        ensure_transition(&existing.status, target)?;

        let mut active: purchase_order::ActiveModel = existing.into();
        active.status = Set(target.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        info!("Purchase order {} moved to {}", po_id, target);
        Ok(model)
    }

    /// Parses and applies a status supplied as a string
    #[instrument(skip(self))]
    pub async fn update_purchase_order_status(
        &self,
        po_id: &Uuid,
        status: &str,
    ) -> Result<purchase_order::Model, ServiceError> {
        let target: PurchaseOrderStatus = status
            .parse()
            .map_err(|_| ServiceError::InvalidStatus(status.to_string()))?;
        self.transition_purchase_order(po_id, target).await
    }

    /// Deletes a purchase order together with its lines
    #[instrument(skip(self))]
    pub async fn delete_purchase_order(&self, po_id: &Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = purchase_order::Entity::delete_by_id(*po_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Purchase order {} not found",
                po_id
            )));
        }

        purchase_order_item::Entity::delete_many()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(*po_id))
            .exec(db)
            .await?;

        info!("Purchase order deleted: {}", po_id);
        Ok(())
    }

    /// Adds a line to a purchase order. Both references are resolved by
    /// explicit lookup; the supplied total is stored verbatim.
    #[instrument(skip(self))]
    pub async fn add_purchase_order_item(
        &self,
        po_id: &Uuid,
        input: NewPurchaseOrderItem,
    ) -> Result<purchase_order_item::Model, ServiceError> {
        let db = &*self.db;

        purchase_order::Entity::find_by_id(*po_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", po_id))
            })?;

        part_code::Entity::find_by_id(input.part_code_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "Part code {} does not exist",
                    input.part_code_id
                ))
            })?;

        let existing = purchase_order_item::Entity::find()
            .filter(purchase_order_item::Column::PoItemNumber.eq(input.po_item_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order item number {} already exists",
                input.po_item_number
            )));
        }

        let now = Utc::now();
        let model = purchase_order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            po_item_number: Set(input.po_item_number),
            purchase_order_id: Set(*po_id),
            part_code_id: Set(input.part_code_id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            total_price: Set(input.total_price),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Purchase order item created: {}", model.id);
        Ok(model)
    }

    /// Lists lines for a purchase order
    #[instrument(skip(self))]
    pub async fn list_purchase_order_items(
        &self,
        po_id: &Uuid,
    ) -> Result<Vec<purchase_order_item::Model>, ServiceError> {
        let db = &*self.db;

        purchase_order::Entity::find_by_id(*po_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", po_id))
            })?;

        let items = purchase_order_item::Entity::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(*po_id))
            .order_by_asc(purchase_order_item::Column::PoItemNumber)
            .all(db)
            .await?;

        Ok(items)
    }

    /// Gets a purchase order line by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order_item(
        &self,
        item_id: &Uuid,
    ) -> Result<Option<purchase_order_item::Model>, ServiceError> {
        let db = &*self.db;
        let item = purchase_order_item::Entity::find_by_id(*item_id).one(db).await?;
        Ok(item)
    }

    /// Updates a purchase order line. As with creation, any supplied total is
    /// stored without cross-checking against quantity and unit price.
    #[instrument(skip(self))]
    pub async fn update_purchase_order_item(
        &self,
        item_id: &Uuid,
        patch: PurchaseOrderItemPatch,
    ) -> Result<purchase_order_item::Model, ServiceError> {
        let db = &*self.db;

        let existing = purchase_order_item::Entity::find_by_id(*item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order item {} not found", item_id))
            })?;

        let mut active: purchase_order_item::ActiveModel = existing.into();
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit_price) = patch.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(total_price) = patch.total_price {
            active.total_price = Set(total_price);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        Ok(model)
    }

    /// Deletes a purchase order line
    #[instrument(skip(self))]
    pub async fn delete_purchase_order_item(&self, item_id: &Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let result = purchase_order_item::Entity::delete_by_id(*item_id)
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Purchase order item {} not found",
                item_id
            )));
        }

        info!("Purchase order item deleted: {}", item_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_can_be_created_or_approved() {
        assert!(ensure_transition("Draft", PurchaseOrderStatus::Created).is_ok());
        assert!(ensure_transition("Draft", PurchaseOrderStatus::Approved).is_ok());
        assert!(ensure_transition("Draft", PurchaseOrderStatus::Received).is_err());
    }

    #[test]
    fn receive_requires_approval() {
        assert!(ensure_transition("Approved", PurchaseOrderStatus::Received).is_ok());
        assert!(ensure_transition("Created", PurchaseOrderStatus::Received).is_err());
    }

    #[test]
    fn received_orders_cannot_be_cancelled() {
        assert!(ensure_transition("Received", PurchaseOrderStatus::Cancelled).is_err());
        assert!(ensure_transition("Approved", PurchaseOrderStatus::Cancelled).is_ok());
        assert!(ensure_transition("Cancelled", PurchaseOrderStatus::Cancelled).is_err());
    }
}
