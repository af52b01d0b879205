mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;
use stock_workflow_api::middleware_helpers::REQUEST_ID_HEADER;

#[tokio::test]
async fn requests_without_tenant_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/transfers", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let body = read_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/write-offs/not-a-uuid", None, Some("tenant-a"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "INVALID_ID");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/write-offs/{}", uuid::Uuid::new_v4()),
            None,
            Some("tenant-a"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["code"], "WRITEOFF_NOT_FOUND");
}

#[tokio::test]
async fn transfer_lifecycle_over_http() {
    let app = TestApp::new().await;
    let tenant = Some("tenant-a");

    let response = app
        .request(Method::POST, "/api/v1/stores", Some(json!({ "name": "Central" })), tenant)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let departure = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(Method::POST, "/api/v1/stores", Some(json!({ "name": "Riverside" })), tenant)
        .await;
    let arrival = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Sparkling water",
                "sku": "WATER-05",
                "stock": 24,
                "price": 1.2,
                "costPrice": 0.5
            })),
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let product = read_json(response).await;
    assert_eq!(product["unit"], "pcs");
    let product_id = product["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/transfers",
            Some(json!({
                "name": "Top up Riverside",
                "departureShopId": departure,
                "arrivalShopId": arrival
            })),
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let transfer = read_json(response).await;
    assert_eq!(transfer["status"], "NEW");
    assert_eq!(transfer["totalQty"], 0);
    let transfer_id = transfer["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/transfers/{}", transfer_id),
            Some(json!({
                "items": [{ "productId": product_id, "qty": 10 }],
                "action": "approve"
            })),
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let approved = read_json(response).await;
    assert_eq!(approved["status"], "APPROVED");
    assert_eq!(approved["totalQty"], 10);
    assert_eq!(approved["arrivalShop"]["name"], "Riverside");
    assert_eq!(approved["finishedBy"]["name"], "Test User");

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", product_id), None, tenant)
        .await;
    assert_eq!(read_json(response).await["stock"], 14);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/movements", product_id),
            None,
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let movements = read_json(response).await;
    assert_eq!(movements["total"], 1);
    assert_eq!(movements["items"][0]["delta"], -10);

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/transfers/{}", transfer_id),
            Some(json!({ "name": "Too late" })),
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "TRANSFER_ALREADY_FINALIZED");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/transfers/{}", transfer_id),
            None,
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn open_inventory_can_be_deleted_over_http() {
    let app = TestApp::new().await;
    let tenant = Some("tenant-a");

    let response = app
        .request(Method::POST, "/api/v1/stores", Some(json!({ "name": "Central" })), tenant)
        .await;
    let shop = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventories",
            Some(json!({ "name": "Spot check", "shopId": shop, "type": "partial" })),
            tenant,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let inventory = read_json(response).await;
    assert_eq!(inventory["statusId"], "open");
    assert_eq!(inventory["type"], "partial");
    let id = inventory["id"].as_str().unwrap().to_string();

    let response = app
        .request(Method::DELETE, &format!("/api/v1/inventories/{}", id), None, tenant)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/inventories/{}", id), None, tenant)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_list_parameters_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/repricings?sortBy=price",
            None,
            Some("tenant-a"),
        )
        .await;
    // Unknown query keys are ignored; unknown sort values are not.
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::GET,
            "/api/v1/repricings?sort_by=price",
            None,
            Some("tenant-a"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "VALIDATION_ERROR");

    let response = app
        .request(
            Method::GET,
            "/api/v1/repricings?date_from=2024-05-02&date_to=2024-05-01",
            None,
            Some("tenant-a"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
