mod common;

use assert_matches::assert_matches;
use common::{stock_item, TestApp};
use rust_decimal_macros::dec;
use stock_workflow_api::{
    entities::workflow_document::{DocumentStatus, WorkflowKind},
    errors::ServiceError,
    services::write_offs::{CreateWriteOffInput, UpdateWriteOffInput},
};

#[tokio::test]
async fn write_off_over_stock_leaves_everything_untouched() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let shop = app.seed_store(&ctx, "Central").await;
    let product = app.seed_product(&ctx, "MILK-1L", 3, dec!(2.5), dec!(1.2)).await;
    let service = &app.state.services.write_offs;

    let write_off = service
        .create(
            &ctx,
            CreateWriteOffInput {
                name: "Expired dairy".to_string(),
                shop_id: shop.id.to_string(),
                doc_type: Some("expired".to_string()),
                comment: Some("found on shelf".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(write_off.doc_type.as_deref(), Some("expired"));
    assert_eq!(write_off.shop.as_ref().map(|s| s.id), Some(shop.id));

    service
        .update(
            &ctx,
            write_off.meta.id,
            UpdateWriteOffInput {
                items: Some(vec![stock_item(product.id, 5)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = service.approve(&ctx, write_off.meta.id).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::QtyExceedsStock { kind: WorkflowKind::WriteOff, requested: 5, available: 3, .. }
    );
    assert_eq!(err.code(), "WRITEOFF_QTY_EXCEEDS_STOCK");

    assert_eq!(app.stock_of(&ctx, product.id).await, 3);
    let reloaded = service.get(&ctx, write_off.meta.id).await.unwrap();
    assert_eq!(reloaded.meta.status, DocumentStatus::New);
}

#[tokio::test]
async fn approved_write_off_removes_stock_and_records_movement() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let shop = app.seed_store(&ctx, "Central").await;
    let product = app.seed_product(&ctx, "MILK-1L", 8, dec!(2.5), dec!(1.2)).await;
    let service = &app.state.services.write_offs;

    let write_off = service
        .create(
            &ctx,
            CreateWriteOffInput {
                name: "Damaged".to_string(),
                shop_id: shop.id.to_string(),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();

    let approved = service
        .update(
            &ctx,
            write_off.meta.id,
            UpdateWriteOffInput {
                name: Some("  Damaged in transit ".to_string()),
                items: Some(vec![stock_item(product.id, 8)]),
                action: Some("approve".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.meta.status, DocumentStatus::Approved);
    assert_eq!(approved.meta.name, "Damaged in transit");
    assert_eq!(approved.totals.total_qty, 8);
    assert_eq!(app.stock_of(&ctx, product.id).await, 0);

    let movements = app
        .state
        .services
        .products
        .movements(&ctx, product.id, None, None)
        .await
        .unwrap();
    assert_eq!(movements.total, 1);
    assert_eq!(movements.items[0].document_kind, WorkflowKind::WriteOff);
    assert_eq!(movements.items[0].delta, -8);
}

#[tokio::test]
async fn unknown_action_is_rejected_before_any_write() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let shop = app.seed_store(&ctx, "Central").await;
    let service = &app.state.services.write_offs;

    let write_off = service
        .create(
            &ctx,
            CreateWriteOffInput {
                name: "Damaged".to_string(),
                shop_id: shop.id.to_string(),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();

    let err = service
        .update(
            &ctx,
            write_off.meta.id,
            UpdateWriteOffInput {
                name: Some("Renamed".to_string()),
                action: Some("finish".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let reloaded = service.get(&ctx, write_off.meta.id).await.unwrap();
    assert_eq!(reloaded.meta.name, "Damaged");
}
