pub mod common;
pub mod items;
pub mod part_codes;
pub mod purchase_orders;
pub mod vendors;

use crate::db::DbPool;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub vendors: Arc<crate::services::vendors::VendorService>,
    pub items: Arc<crate::services::items::ItemService>,
    pub part_codes: Arc<crate::services::part_codes::PartCodeService>,
    pub procurement: Arc<crate::services::procurement::PurchaseOrderService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            vendors: Arc::new(crate::services::vendors::VendorService::new(db.clone())),
            items: Arc::new(crate::services::items::ItemService::new(db.clone())),
            part_codes: Arc::new(crate::services::part_codes::PartCodeService::new(db.clone())),
            procurement: Arc::new(crate::services::procurement::PurchaseOrderService::new(db)),
        }
    }
}
