use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::part_codes::{NewPartCode, PartCodePatch},
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
pub struct CreatePartCodeRequest {
    /// Unique business identifier of the part code
    #[validate(length(min = 1))]
    pub part_code_number: String,
    /// Catalog item this part code belongs to
    pub item_id: Uuid,
    pub size_name: Option<String>,
    pub colour_name: Option<String>,
    pub serial_number: Option<String>,
    pub item_make_name: Option<String>,
    #[validate(length(min = 1))]
    pub measurement_unit: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePartCodeRequest {
    pub size_name: Option<String>,
    pub colour_name: Option<String>,
    pub serial_number: Option<String>,
    pub item_make_name: Option<String>,
    #[validate(length(min = 1))]
    pub measurement_unit: Option<String>,
}

// Handler functions

/// Create a new part code
#[utoipa::path(
    post,
    path = "/api/v1/part-codes",
    request_body = CreatePartCodeRequest,
    responses(
        (status = 201, description = "Part code created"),
        (status = 400, description = "Invalid request or unknown item"),
        (status = 409, description = "Part code number already exists")
    ),
    tag = "part-codes"
)]
pub async fn create_part_code(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreatePartCodeRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let part_code = state
        .services
        .part_codes
        .create_part_code(NewPartCode {
            part_code_number: payload.part_code_number,
            item_id: payload.item_id,
            size_name: payload.size_name,
            colour_name: payload.colour_name,
            serial_number: payload.serial_number,
            item_make_name: payload.item_make_name,
            measurement_unit: payload.measurement_unit,
        })
        .await
        .map_err(map_service_error)?;

    info!("Part code created: {}", part_code.id);

    Ok(created_response(part_code))
}

/// List part codes with pagination
#[utoipa::path(
    get,
    path = "/api/v1/part-codes",
    params(PaginationParams),
    responses(
        (status = 200, description = "Part codes listed")
    ),
    tag = "part-codes"
)]
pub async fn list_part_codes(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (part_codes, total) = state
        .services
        .part_codes
        .list_part_codes(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        part_codes,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a part code by ID
#[utoipa::path(
    get,
    path = "/api/v1/part-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Part code ID")
    ),
    responses(
        (status = 200, description = "Part code fetched"),
        (status = 404, description = "Part code not found")
    ),
    tag = "part-codes"
)]
pub async fn get_part_code(
    State(state): State<AppState>,
    Path(part_code_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let part_code = state
        .services
        .part_codes
        .get_part_code(&part_code_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Part code with ID {} not found", part_code_id))
        })?;

    Ok(success_response(part_code))
}

/// Get a part code by its unique number
#[utoipa::path(
    get,
    path = "/api/v1/part-codes/by-number/{part_code_number}",
    params(
        ("part_code_number" = String, Path, description = "Part code number")
    ),
    responses(
        (status = 200, description = "Part code fetched"),
        (status = 404, description = "Part code not found")
    ),
    tag = "part-codes"
)]
pub async fn get_part_code_by_number(
    State(state): State<AppState>,
    Path(part_code_number): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let part_code = state
        .services
        .part_codes
        .get_part_code_by_number(&part_code_number)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Part code {} not found", part_code_number))
        })?;

    Ok(success_response(part_code))
}

/// Update a part code
#[utoipa::path(
    put,
    path = "/api/v1/part-codes/{id}",
    request_body = UpdatePartCodeRequest,
    params(
        ("id" = Uuid, Path, description = "Part code ID")
    ),
    responses(
        (status = 200, description = "Part code updated"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Part code not found")
    ),
    tag = "part-codes"
)]
pub async fn update_part_code(
    State(state): State<AppState>,
    Path(part_code_id): Path<Uuid>,
    Json(payload): Json<UpdatePartCodeRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let part_code = state
        .services
        .part_codes
        .update_part_code(
            &part_code_id,
            PartCodePatch {
                size_name: payload.size_name,
                colour_name: payload.colour_name,
                serial_number: payload.serial_number,
                item_make_name: payload.item_make_name,
                measurement_unit: payload.measurement_unit,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Part code updated: {}", part_code_id);

    Ok(success_response(part_code))
}

/// Delete a part code
#[utoipa::path(
    delete,
    path = "/api/v1/part-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Part code ID")
    ),
    responses(
        (status = 204, description = "Part code deleted"),
        (status = 404, description = "Part code not found")
    ),
    tag = "part-codes"
)]
pub async fn delete_part_code(
    State(state): State<AppState>,
    Path(part_code_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .part_codes
        .delete_part_code(&part_code_id)
        .await
        .map_err(map_service_error)?;

    info!("Part code deleted: {}", part_code_id);

    Ok(no_content_response())
}

/// Creates the router for part code read/write endpoints
pub fn part_code_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_part_code))
        .route("/", get(list_part_codes))
        .route("/by-number/:part_code_number", get(get_part_code_by_number))
        .route("/:id", get(get_part_code))
        .route("/:id", put(update_part_code))
}

/// Creates the router for part code delete endpoints (admin only)
pub fn part_code_delete_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_part_code))
}
