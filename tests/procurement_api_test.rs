//! Integration tests for the procurement resources: vendors, items, part
//! codes, purchase orders and their lines.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use serde_json::{json, Value};

async fn create_vendor(app: &TestApp, vendor_number: &str) -> Value {
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/vendors",
            Some(json!({
                "vendor_number": vendor_number,
                "name": "Acme Industrial Supply",
                "contact_name": "Dana Reyes",
                "email": "dana@acme-supply.example",
                "phone": "+1-555-010-2030"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await
}

async fn create_item(app: &TestApp, item_code: &str) -> Value {
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/items",
            Some(json!({
                "item_code": item_code,
                "name": "Hex bolt",
                "description": "M8 hex bolt, zinc plated"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await
}

async fn create_part_code(app: &TestApp, part_code_number: &str, item_id: &str) -> Value {
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/part-codes",
            Some(json!({
                "part_code_number": part_code_number,
                "item_id": item_id,
                "size_name": "M8",
                "colour_name": "Silver",
                "item_make_name": "FastenCo",
                "measurement_unit": "piece"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await
}

async fn create_purchase_order(app: &TestApp, po_number: &str, vendor_id: &str) -> Value {
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "po_number": po_number,
                "vendor_id": vendor_id,
                "payment_terms": "Net 30",
                "delivery_date": "2026-09-15"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await
}

// ==================== Vendor Tests ====================

#[tokio::test]
async fn vendor_crud_round_trip() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-001").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");

    let fetched = app
        .request_authenticated(Method::GET, &format!("/api/v1/vendors/{}", vendor_id), None)
        .await;
    assert_eq!(fetched.status(), 200);
    let fetched = response_json(fetched).await;
    assert_eq!(fetched["vendor_number"], "VEN-001");
    assert_eq!(fetched["is_active"], true);

    let updated = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/vendors/{}", vendor_id),
            Some(json!({"name": "Acme Industrial Holdings", "is_active": false})),
        )
        .await;
    assert_eq!(updated.status(), 200);
    let updated = response_json(updated).await;
    assert_eq!(updated["name"], "Acme Industrial Holdings");
    assert_eq!(updated["is_active"], false);

    let deleted = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/vendors/{}", vendor_id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), 204);

    let missing = app
        .request_authenticated(Method::GET, &format!("/api/v1/vendors/{}", vendor_id), None)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn duplicate_vendor_number_conflicts() {
    let app = TestApp::new().await;

    create_vendor(&app, "VEN-DUP").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/vendors",
            Some(json!({"vendor_number": "VEN-DUP", "name": "Other Vendor"})),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn vendor_validation_rejects_empty_name() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/vendors",
            Some(json!({"vendor_number": "VEN-X", "name": ""})),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn vendor_list_is_paginated() {
    let app = TestApp::new().await;

    for i in 0..3 {
        create_vendor(&app, &format!("VEN-PAGE-{}", i)).await;
    }

    let response = app
        .request_authenticated(Method::GET, "/api/v1/vendors?page=1&per_page=2", None)
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(|d| d.len()), Some(2));
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
}

// ==================== Part Code Tests ====================

#[tokio::test]
async fn part_code_requires_existing_item() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/part-codes",
            Some(json!({
                "part_code_number": "PC-ORPHAN",
                "item_id": "3f0a1d7e-6f3b-4e5e-8f4e-2f1a9e8d7c6b",
                "measurement_unit": "piece"
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn part_code_lookup_by_number() {
    let app = TestApp::new().await;

    let item = create_item(&app, "ITM-100").await;
    let item_id = item["id"].as_str().expect("item id");
    create_part_code(&app, "PC-100-M8", item_id).await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/part-codes/by-number/PC-100-M8", None)
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["part_code_number"], "PC-100-M8");
    assert_eq!(body["item_id"], item_id);
    assert_eq!(body["measurement_unit"], "piece");
}

#[tokio::test]
async fn duplicate_part_code_number_conflicts() {
    let app = TestApp::new().await;

    let item = create_item(&app, "ITM-DUP").await;
    let item_id = item["id"].as_str().expect("item id");
    create_part_code(&app, "PC-DUP", item_id).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/part-codes",
            Some(json!({
                "part_code_number": "PC-DUP",
                "item_id": item_id,
                "measurement_unit": "box"
            })),
        )
        .await;
    assert_eq!(response.status(), 409);
}

// ==================== Purchase Order Tests ====================

#[tokio::test]
async fn new_purchase_orders_start_in_draft() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-PO").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");

    let po = create_purchase_order(&app, "PO-1001", vendor_id).await;

    // "Draft" is deliberately outside the declared status set.
    assert_eq!(po["status"], "Draft");
    assert_eq!(po["po_number"], "PO-1001");
    assert_eq!(po["vendor_id"], vendor_id);
}

#[tokio::test]
async fn purchase_order_requires_existing_vendor() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "po_number": "PO-NOVENDOR",
                "vendor_id": "3f0a1d7e-6f3b-4e5e-8f4e-2f1a9e8d7c6b",
                "delivery_date": "2026-09-15"
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn duplicate_po_number_conflicts() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-PODUP").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    create_purchase_order(&app, "PO-DUP", vendor_id).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "po_number": "PO-DUP",
                "vendor_id": vendor_id,
                "delivery_date": "2026-10-01"
            })),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn purchase_order_lookup_by_number_and_vendor() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-LOOKUP").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    create_purchase_order(&app, "PO-LOOKUP-1", vendor_id).await;
    create_purchase_order(&app, "PO-LOOKUP-2", vendor_id).await;

    let by_number = app
        .request_authenticated(
            Method::GET,
            "/api/v1/purchase-orders/by-number/PO-LOOKUP-1",
            None,
        )
        .await;
    assert_eq!(by_number.status(), 200);
    let by_number = response_json(by_number).await;
    assert_eq!(by_number["po_number"], "PO-LOOKUP-1");

    let by_vendor = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/purchase-orders/vendor/{}", vendor_id),
            None,
        )
        .await;
    assert_eq!(by_vendor.status(), 200);
    let by_vendor = response_json(by_vendor).await;
    assert_eq!(by_vendor.as_array().map(|o| o.len()), Some(2));
}

#[tokio::test]
async fn purchase_order_lifecycle_transitions() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-LIFE").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let po = create_purchase_order(&app, "PO-LIFE", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    let approved = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/approve", po_id),
            None,
        )
        .await;
    assert_eq!(approved.status(), 200);
    assert_eq!(response_json(approved).await["status"], "Approved");

    let received = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/receive", po_id),
            None,
        )
        .await;
    assert_eq!(received.status(), 200);
    assert_eq!(response_json(received).await["status"], "Received");

    // Received orders cannot be cancelled.
    let cancelled = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/cancel", po_id),
            None,
        )
        .await;
    assert_eq!(cancelled.status(), 400);
}

#[tokio::test]
async fn unknown_status_string_is_rejected() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-STATUS").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let po = create_purchase_order(&app, "PO-STATUS", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/purchase-orders/{}/status", po_id),
            Some(json!({"status": "Shipped"})),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/purchase-orders/{}/status", po_id),
            Some(json!({"status": "Created"})),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["status"], "Created");
}

// ==================== Purchase Order Item Tests ====================

#[tokio::test]
async fn total_price_is_stored_as_supplied() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-TOTAL").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let item = create_item(&app, "ITM-TOTAL").await;
    let item_id = item["id"].as_str().expect("item id");
    let part_code = create_part_code(&app, "PC-TOTAL", item_id).await;
    let part_code_id = part_code["id"].as_str().expect("part code id");
    let po = create_purchase_order(&app, "PO-TOTAL", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    // quantity * unit_price would be 30; the mismatched 31 must survive
    // untouched because the relationship is convention only.
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/items", po_id),
            Some(json!({
                "po_item_number": "POI-TOTAL-1",
                "part_code_id": part_code_id,
                "quantity": 3,
                "unit_price": 10,
                "total_price": 31
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = response_json(response).await;
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["unit_price"], "10");
    assert_eq!(body["total_price"], "31");
}

#[tokio::test]
async fn purchase_order_item_crud_round_trip() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-LINES").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let item = create_item(&app, "ITM-LINES").await;
    let item_id = item["id"].as_str().expect("item id");
    let part_code = create_part_code(&app, "PC-LINES", item_id).await;
    let part_code_id = part_code["id"].as_str().expect("part code id");
    let po = create_purchase_order(&app, "PO-LINES", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    let created = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/items", po_id),
            Some(json!({
                "po_item_number": "POI-LINES-1",
                "part_code_id": part_code_id,
                "quantity": 5,
                "unit_price": "2.50",
                "total_price": "12.50"
            })),
        )
        .await;
    assert_eq!(created.status(), 201);
    let created = response_json(created).await;
    let line_id = created["id"].as_str().expect("line id");

    let listed = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/purchase-orders/{}/items", po_id),
            None,
        )
        .await;
    assert_eq!(listed.status(), 200);
    let listed = response_json(listed).await;
    assert_eq!(listed.as_array().map(|l| l.len()), Some(1));

    let updated = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/purchase-order-items/{}", line_id),
            Some(json!({"quantity": 6, "total_price": "15.00"})),
        )
        .await;
    assert_eq!(updated.status(), 200);
    let updated = response_json(updated).await;
    assert_eq!(updated["quantity"], 6);
    assert_eq!(updated["total_price"], "15.00");

    let deleted = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/purchase-order-items/{}", line_id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), 204);

    let missing = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/purchase-order-items/{}", line_id),
            None,
        )
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn purchase_order_item_requires_existing_part_code() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-BADLINE").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let po = create_purchase_order(&app, "PO-BADLINE", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/items", po_id),
            Some(json!({
                "po_item_number": "POI-BADLINE",
                "part_code_id": "3f0a1d7e-6f3b-4e5e-8f4e-2f1a9e8d7c6b",
                "quantity": 1,
                "unit_price": "1.00",
                "total_price": "1.00"
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn deleting_purchase_order_removes_its_lines() {
    let app = TestApp::new().await;

    let vendor = create_vendor(&app, "VEN-CASCADE").await;
    let vendor_id = vendor["id"].as_str().expect("vendor id");
    let item = create_item(&app, "ITM-CASCADE").await;
    let item_id = item["id"].as_str().expect("item id");
    let part_code = create_part_code(&app, "PC-CASCADE", item_id).await;
    let part_code_id = part_code["id"].as_str().expect("part code id");
    let po = create_purchase_order(&app, "PO-CASCADE", vendor_id).await;
    let po_id = po["id"].as_str().expect("po id");

    let created = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/items", po_id),
            Some(json!({
                "po_item_number": "POI-CASCADE",
                "part_code_id": part_code_id,
                "quantity": 2,
                "unit_price": "4.00",
                "total_price": "8.00"
            })),
        )
        .await;
    let line_id = response_json(created).await["id"]
        .as_str()
        .expect("line id")
        .to_string();

    let deleted = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/purchase-orders/{}", po_id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), 204);

    let missing_line = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/purchase-order-items/{}", line_id),
            None,
        )
        .await;
    assert_eq!(missing_line.status(), 404);
}

// ==================== Concurrency Smoke Test ====================

#[tokio::test]
async fn concurrent_reads_with_same_token() {
    let app = TestApp::new().await;

    let futures: Vec<_> = (0..5)
        .map(|_| app.request_authenticated(Method::GET, "/api/v1/purchase-orders", None))
        .collect();

    let responses = futures::future::join_all(futures).await;

    for (i, response) in responses.into_iter().enumerate() {
        assert_eq!(response.status(), 200, "concurrent request {} failed", i);
    }
}
