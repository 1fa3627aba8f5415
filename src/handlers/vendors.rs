use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::vendors::{NewVendor, VendorPatch},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    /// Unique business identifier of the vendor
    #[validate(length(min = 1))]
    pub vendor_number: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

// Handler functions

/// Create a new vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created"),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Vendor number already exists")
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateVendorRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .create_vendor(NewVendor {
            vendor_number: payload.vendor_number,
            name: payload.name,
            contact_name: payload.contact_name,
            email: payload.email,
            phone: payload.phone,
        })
        .await
        .map_err(map_service_error)?;

    info!("Vendor created: {}", vendor.id);

    Ok(created_response(vendor))
}

/// List vendors with pagination
#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    params(PaginationParams),
    responses(
        (status = 200, description = "Vendors listed")
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (vendors, total) = state
        .services
        .vendors
        .list_vendors(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        vendors,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a vendor by ID
#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Vendor fetched"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let vendor = state
        .services
        .vendors
        .get_vendor(&vendor_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Vendor with ID {} not found", vendor_id)))?;

    Ok(success_response(vendor))
}

/// Update a vendor
#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    request_body = UpdateVendorRequest,
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Vendor updated"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
    Json(payload): Json<UpdateVendorRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .update_vendor(
            &vendor_id,
            VendorPatch {
                name: payload.name,
                contact_name: payload.contact_name,
                email: payload.email,
                phone: payload.phone,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Vendor updated: {}", vendor_id);

    Ok(success_response(vendor))
}

/// Delete a vendor
#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .vendors
        .delete_vendor(&vendor_id)
        .await
        .map_err(map_service_error)?;

    info!("Vendor deleted: {}", vendor_id);

    Ok(no_content_response())
}

/// Creates the router for vendor read/write endpoints
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vendor))
        .route("/", get(list_vendors))
        .route("/:id", get(get_vendor))
        .route("/:id", put(update_vendor))
}

/// Creates the router for vendor delete endpoints (admin only)
pub fn vendor_delete_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_vendor))
}
