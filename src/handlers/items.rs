use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::items::{ItemPatch, NewItem},
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
pub struct CreateItemRequest {
    /// Unique business identifier of the catalog item
    #[validate(length(min = 1))]
    pub item_code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
}

// Handler functions

/// Create a new catalog item
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Item code already exists")
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .items
        .create_item(NewItem {
            item_code: payload.item_code,
            name: payload.name,
            description: payload.description,
        })
        .await
        .map_err(map_service_error)?;

    info!("Item created: {}", item.id);

    Ok(created_response(item))
}

/// List catalog items with pagination
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(PaginationParams),
    responses(
        (status = 200, description = "Items listed")
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .items
        .list_items(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a catalog item by ID
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item fetched"),
        (status = 404, description = "Item not found")
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item = state
        .services
        .items
        .get_item(&item_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Item with ID {} not found", item_id)))?;

    Ok(success_response(item))
}

/// Update a catalog item
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    request_body = UpdateItemRequest,
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Item not found")
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .items
        .update_item(
            &item_id,
            ItemPatch {
                name: payload.name,
                description: payload.description,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Item updated: {}", item_id);

    Ok(success_response(item))
}

/// Delete a catalog item
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .items
        .delete_item(&item_id)
        .await
        .map_err(map_service_error)?;

    info!("Item deleted: {}", item_id);

    Ok(no_content_response())
}

/// Creates the router for item read/write endpoints
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item))
        .route("/", get(list_items))
        .route("/:id", get(get_item))
        .route("/:id", put(update_item))
}

/// Creates the router for item delete endpoints (admin only)
pub fn item_delete_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_item))
}
