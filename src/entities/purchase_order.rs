use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Declared purchase order statuses. Note that freshly created orders carry
/// the out-of-band "Draft" string, which is not a member of this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PurchaseOrderStatus {
    Created,
    Approved,
    Received,
    Cancelled,
}

/// Status written to newly created purchase orders.
pub const INITIAL_STATUS: &str = "Draft";

/// Purchase order header.
///
/// Status is stored as a free-form string: new orders are written with the
/// literal "Draft" even though the declared transition set is Created,
/// Approved, Received, Cancelled. That mismatch is preserved from the source
/// system on purpose; `PurchaseOrderStatus` governs only the explicit
/// transition endpoints.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub po_number: String,
    pub vendor_id: Uuid,
    pub payment_terms: Option<String>,
    pub delivery_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    PurchaseOrderItems,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
