use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Procure API",
        version = "1.0.0",
        description = r#"
# Procure API

Procurement and inventory management backend: purchase orders, purchase order
items, part codes, vendors, and catalog items.

## Authentication

All `/api/v1` endpoints require a JWT bearer token obtained from
`POST /api/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

Access tokens expire after one hour; exchange the refresh token at
`POST /api/auth/refresh` for a new pair.

## Error Handling

Errors use a consistent response format with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` and `per_page` query parameters.
"#
    ),
    paths(
        handlers::vendors::create_vendor,
        handlers::vendors::list_vendors,
        handlers::vendors::get_vendor,
        handlers::vendors::update_vendor,
        handlers::vendors::delete_vendor,
        handlers::items::create_item,
        handlers::items::list_items,
        handlers::items::get_item,
        handlers::items::update_item,
        handlers::items::delete_item,
        handlers::part_codes::create_part_code,
        handlers::part_codes::list_part_codes,
        handlers::part_codes::get_part_code,
        handlers::part_codes::get_part_code_by_number,
        handlers::part_codes::update_part_code,
        handlers::part_codes::delete_part_code,
        handlers::purchase_orders::create_purchase_order,
        handlers::purchase_orders::list_purchase_orders,
        handlers::purchase_orders::get_purchase_order,
        handlers::purchase_orders::get_purchase_order_by_number,
        handlers::purchase_orders::get_purchase_orders_by_vendor,
        handlers::purchase_orders::update_purchase_order,
        handlers::purchase_orders::update_purchase_order_status,
        handlers::purchase_orders::approve_purchase_order,
        handlers::purchase_orders::receive_purchase_order,
        handlers::purchase_orders::cancel_purchase_order,
        handlers::purchase_orders::delete_purchase_order,
        handlers::purchase_orders::add_purchase_order_item,
        handlers::purchase_orders::list_purchase_order_items,
        handlers::purchase_orders::get_purchase_order_item,
        handlers::purchase_orders::update_purchase_order_item,
        handlers::purchase_orders::delete_purchase_order_item,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        handlers::vendors::CreateVendorRequest,
        handlers::vendors::UpdateVendorRequest,
        handlers::items::CreateItemRequest,
        handlers::items::UpdateItemRequest,
        handlers::part_codes::CreatePartCodeRequest,
        handlers::part_codes::UpdatePartCodeRequest,
        handlers::purchase_orders::CreatePurchaseOrderRequest,
        handlers::purchase_orders::UpdatePurchaseOrderRequest,
        handlers::purchase_orders::UpdatePurchaseOrderStatusRequest,
        handlers::purchase_orders::CreatePurchaseOrderItemRequest,
        handlers::purchase_orders::UpdatePurchaseOrderItemRequest,
    )),
    tags(
        (name = "vendors", description = "Vendor management"),
        (name = "items", description = "Catalog item management"),
        (name = "part-codes", description = "Part code management"),
        (name = "purchase-orders", description = "Purchase order management"),
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
