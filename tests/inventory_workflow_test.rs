mod common;

use assert_matches::assert_matches;
use common::{inventory_item, TestApp};
use rust_decimal_macros::dec;
use stock_workflow_api::{
    auth::TenantContext,
    entities::workflow_document::{DocumentStatus, WorkflowKind},
    errors::ServiceError,
    services::inventories::{CreateInventoryInput, UpdateInventoryInput},
    services::workflow::{InventoryItemInput, InventoryView},
};

async fn new_inventory(app: &TestApp, ctx: &TenantContext) -> InventoryView {
    let shop = app.seed_store(ctx, "Central").await;
    app.state
        .services
        .inventories
        .create(
            ctx,
            CreateInventoryInput {
                name: "Monthly count".to_string(),
                shop_id: shop.id.to_string(),
                doc_type: Some("full".to_string()),
                comment: None,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn finishing_sets_stock_to_the_scanned_count() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "SOAP", 10, dec!(4.0), dec!(2.0)).await;
    let inventory = new_inventory(&app, &ctx).await;
    assert_eq!(inventory.status_id, "open");

    let counted = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                items: Some(vec![inventory_item(product.id, 7)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(counted.items[0].declared, 10);
    assert_eq!(counted.totals.shortage, 1);
    assert_eq!(counted.totals.surplus, 0);
    assert_eq!(counted.totals.total_measurement_value, 7);
    assert_eq!(counted.totals.difference_sum, dec!(-6.0));

    let finished = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                action: Some("finish".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(finished.meta.status, DocumentStatus::Approved);
    assert_eq!(finished.status_id, "finished");
    assert_eq!(app.stock_of(&ctx, product.id).await, 7);

    let movements = app
        .state
        .services
        .products
        .movements(&ctx, product.id, None, None)
        .await
        .unwrap();
    assert_eq!(movements.total, 1);
    assert_eq!(movements.items[0].document_kind, WorkflowKind::Inventory);
    assert_eq!(movements.items[0].previous_stock, 10);
    assert_eq!(movements.items[0].new_stock, 7);
}

#[tokio::test]
async fn reconciliation_is_absolute_not_relative() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "SOAP", 10, dec!(4.0), dec!(2.0)).await;
    let inventory = new_inventory(&app, &ctx).await;

    app.state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                items: Some(vec![InventoryItemInput {
                    product_id: product.id.to_string(),
                    scanned: 12,
                    declared: Some(10),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Stock drifts after the count was declared.
    let write_off_shop = app.seed_store(&ctx, "Back room").await;
    let write_off = app
        .state
        .services
        .write_offs
        .create(
            &ctx,
            stock_workflow_api::services::write_offs::CreateWriteOffInput {
                name: "Broken".to_string(),
                shop_id: write_off_shop.id.to_string(),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();
    app.state
        .services
        .write_offs
        .update(
            &ctx,
            write_off.meta.id,
            stock_workflow_api::services::write_offs::UpdateWriteOffInput {
                items: Some(vec![common::stock_item(product.id, 4)]),
                action: Some("approve".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(app.stock_of(&ctx, product.id).await, 6);

    app.state
        .services
        .inventories
        .finish(&ctx, inventory.meta.id)
        .await
        .unwrap();
    assert_eq!(app.stock_of(&ctx, product.id).await, 12);
}

#[tokio::test]
async fn cancelled_inventory_leaves_stock_alone() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "SOAP", 10, dec!(4.0), dec!(2.0)).await;
    let inventory = new_inventory(&app, &ctx).await;

    let cancelled = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                items: Some(vec![inventory_item(product.id, 0)]),
                action: Some("cancel".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.meta.status, DocumentStatus::Rejected);
    assert_eq!(cancelled.status_id, "cancelled");
    assert_eq!(app.stock_of(&ctx, product.id).await, 10);

    let err = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                name: Some("Recount".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyFinalized { kind: WorkflowKind::Inventory, .. });
}

#[tokio::test]
async fn negative_scanned_quantity_is_invalid() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "SOAP", 10, dec!(4.0), dec!(2.0)).await;
    let inventory = new_inventory(&app, &ctx).await;

    let err = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                items: Some(vec![inventory_item(product.id, -1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn a_product_counted_twice_is_rejected() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "SOAP", 10, dec!(4.0), dec!(2.0)).await;
    let inventory = new_inventory(&app, &ctx).await;

    let err = app
        .state
        .services
        .inventories
        .update(
            &ctx,
            inventory.meta.id,
            UpdateInventoryInput {
                items: Some(vec![inventory_item(product.id, 3), inventory_item(product.id, 4)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let reloaded = app
        .state
        .services
        .inventories
        .get(&ctx, inventory.meta.id)
        .await
        .unwrap();
    assert!(reloaded.items.is_empty());
    assert_eq!(reloaded.totals.shortage, 0);
    assert_eq!(app.stock_of(&ctx, product.id).await, 10);
}
