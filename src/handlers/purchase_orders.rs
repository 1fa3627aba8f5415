use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    auth::AuthenticatedUser,
    entities::purchase_order::PurchaseOrderStatus,
    errors::ApiError,
    handlers::AppState,
    services::procurement::{
        NewPurchaseOrder, NewPurchaseOrderItem, PurchaseOrderItemPatch, PurchaseOrderPatch,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    /// Unique business identifier of the purchase order
    #[validate(length(min = 1))]
    pub po_number: String,
    pub vendor_id: Uuid,
    pub payment_terms: Option<String>,
    /// Expected delivery date, `YYYY-MM-DD`
    #[validate(length(min = 1))]
    pub delivery_date: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    pub payment_terms: Option<String>,
    /// Expected delivery date, `YYYY-MM-DD`
    pub delivery_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderItemRequest {
    /// Unique business identifier of the line
    #[validate(length(min = 1))]
    pub po_item_number: String,
    pub part_code_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Stored as supplied; not reconciled with quantity and unit price
    pub total_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderItemRequest {
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
}

fn parse_delivery_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ApiError::ValidationError(format!("Invalid date format: {}", e)))
}

// Handler functions

/// Create a new purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created"),
        (status = 400, description = "Invalid request or unknown vendor"),
        (status = 409, description = "Purchase order number already exists")
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let delivery_date = parse_delivery_date(&payload.delivery_date)?;

    let po = state
        .services
        .procurement
        .create_purchase_order(NewPurchaseOrder {
            po_number: payload.po_number,
            vendor_id: payload.vendor_id,
            payment_terms: payload.payment_terms,
            delivery_date,
        })
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", po.id);

    Ok(created_response(po))
}

/// List purchase orders with pagination
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Purchase orders listed")
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (orders, total) = state
        .services
        .procurement
        .list_purchase_orders(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        orders,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order fetched"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .get_purchase_order(&po_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order with ID {} not found", po_id)))?;

    Ok(success_response(po))
}

/// Get a purchase order by its unique number
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/by-number/{po_number}",
    params(
        ("po_number" = String, Path, description = "Purchase order number")
    ),
    responses(
        (status = 200, description = "Purchase order fetched"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order_by_number(
    State(state): State<AppState>,
    Path(po_number): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .get_purchase_order_by_number(&po_number)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order {} not found", po_number)))?;

    Ok(success_response(po))
}

/// Get purchase orders for a vendor
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/vendor/{vendor_id}",
    params(
        ("vendor_id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Purchase orders by vendor")
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_orders_by_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .procurement
        .get_purchase_orders_by_vendor(&vendor_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Update a purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    request_body = UpdatePurchaseOrderRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order updated"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let delivery_date = match &payload.delivery_date {
        Some(raw) => Some(parse_delivery_date(raw)?),
        None => None,
    };

    let po = state
        .services
        .procurement
        .update_purchase_order(
            &po_id,
            PurchaseOrderPatch {
                payment_terms: payload.payment_terms,
                delivery_date,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Purchase order updated: {}", po_id);

    Ok(success_response(po))
}

/// Update purchase order status
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}/status",
    request_body = UpdatePurchaseOrderStatusRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order status updated"),
        (status = 400, description = "Invalid status or transition"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order_status(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let po = state
        .services
        .procurement
        .update_purchase_order_status(&po_id, &payload.status)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order {} status set to {}", po_id, po.status);

    Ok(success_response(po))
}

/// Approve a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order approved"),
        (status = 400, description = "Invalid transition"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn approve_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .transition_purchase_order(&po_id, PurchaseOrderStatus::Approved)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order approved: {}", po_id);

    Ok(success_response(po))
}

/// Mark a purchase order as received
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/receive",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order received"),
        (status = 400, description = "Invalid transition"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .transition_purchase_order(&po_id, PurchaseOrderStatus::Received)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order received: {}", po_id);

    Ok(success_response(po))
}

/// Cancel a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order cancelled"),
        (status = 400, description = "Invalid transition"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .transition_purchase_order(&po_id, PurchaseOrderStatus::Cancelled)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order cancelled: {}", po_id);

    Ok(success_response(po))
}

/// Delete a purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .procurement
        .delete_purchase_order(&po_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order deleted: {}", po_id);

    Ok(no_content_response())
}

/// Add a line to a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/items",
    request_body = CreatePurchaseOrderItemRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 201, description = "Purchase order item created"),
        (status = 400, description = "Invalid request or unknown part code"),
        (status = 404, description = "Purchase order not found"),
        (status = 409, description = "Purchase order item number already exists")
    ),
    tag = "purchase-orders"
)]
pub async fn add_purchase_order_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<CreatePurchaseOrderItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .procurement
        .add_purchase_order_item(
            &po_id,
            NewPurchaseOrderItem {
                po_item_number: payload.po_item_number,
                part_code_id: payload.part_code_id,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
                total_price: payload.total_price,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Purchase order item created: {}", item.id);

    Ok(created_response(item))
}

/// List lines for a purchase order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order items listed"),
        (status = 404, description = "Purchase order not found")
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_order_items(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .procurement
        .list_purchase_order_items(&po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Get a purchase order line by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-order-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order item ID")
    ),
    responses(
        (status = 200, description = "Purchase order item fetched"),
        (status = 404, description = "Purchase order item not found")
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item = state
        .services
        .procurement
        .get_purchase_order_item(&item_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Purchase order item with ID {} not found", item_id))
        })?;

    Ok(success_response(item))
}

/// Update a purchase order line
#[utoipa::path(
    put,
    path = "/api/v1/purchase-order-items/{id}",
    request_body = UpdatePurchaseOrderItemRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order item ID")
    ),
    responses(
        (status = 200, description = "Purchase order item updated"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Purchase order item not found")
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .procurement
        .update_purchase_order_item(
            &item_id,
            PurchaseOrderItemPatch {
                quantity: payload.quantity,
                unit_price: payload.unit_price,
                total_price: payload.total_price,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Purchase order item updated: {}", item_id);

    Ok(success_response(item))
}

/// Delete a purchase order line
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-order-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order item ID")
    ),
    responses(
        (status = 204, description = "Purchase order item deleted"),
        (status = 404, description = "Purchase order item not found")
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .procurement
        .delete_purchase_order_item(&item_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order item deleted: {}", item_id);

    Ok(no_content_response())
}

/// Creates the router for purchase order read/write endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order))
        .route("/", get(list_purchase_orders))
        .route("/by-number/:po_number", get(get_purchase_order_by_number))
        .route("/vendor/:vendor_id", get(get_purchase_orders_by_vendor))
        .route("/:id", get(get_purchase_order))
        .route("/:id", put(update_purchase_order))
        .route("/:id/status", put(update_purchase_order_status))
        .route("/:id/approve", post(approve_purchase_order))
        .route("/:id/receive", post(receive_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order))
        .route("/:id/items", post(add_purchase_order_item))
        .route("/:id/items", get(list_purchase_order_items))
}

/// Creates the router for purchase order delete endpoints (admin only)
pub fn purchase_order_delete_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_purchase_order))
}

/// Creates the router for standalone purchase order line endpoints
pub fn purchase_order_item_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_purchase_order_item))
        .route("/:id", put(update_purchase_order_item))
}

/// Creates the router for purchase order line delete endpoints (admin only)
pub fn purchase_order_item_delete_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_purchase_order_item))
}
