mod common;

use common::{stock_item, TestApp};
use rust_decimal_macros::dec;
use stock_workflow_api::services::{
    transfers::{CreateTransferInput, UpdateTransferInput},
    workflow::ListDocumentsQuery,
    write_offs::{CreateWriteOffInput, UpdateWriteOffInput},
};

#[tokio::test]
async fn documents_are_invisible_to_other_tenants() {
    let app = TestApp::new().await;
    let tenant_a = app.ctx("tenant-a");
    let tenant_b = app.ctx("tenant-b");
    let from = app.seed_store(&tenant_a, "Central").await;
    let to = app.seed_store(&tenant_a, "Riverside").await;
    let transfers = &app.state.services.transfers;

    let transfer = transfers
        .create(
            &tenant_a,
            CreateTransferInput {
                name: "A only".to_string(),
                departure_shop_id: from.id.to_string(),
                arrival_shop_id: to.id.to_string(),
                comment: None,
            },
        )
        .await
        .unwrap();

    let err = transfers.get(&tenant_b, transfer.meta.id).await.unwrap_err();
    assert_eq!(err.code(), "TRANSFER_NOT_FOUND");

    let err = transfers.approve(&tenant_b, transfer.meta.id).await.unwrap_err();
    assert_eq!(err.code(), "TRANSFER_NOT_FOUND");

    let err = transfers.delete(&tenant_b, transfer.meta.id).await.unwrap_err();
    assert_eq!(err.code(), "TRANSFER_NOT_FOUND");

    let listed = transfers
        .list(&tenant_b, &ListDocumentsQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);

    let listed = transfers
        .list(&tenant_a, &ListDocumentsQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
}

#[tokio::test]
async fn stores_of_another_tenant_cannot_be_referenced() {
    let app = TestApp::new().await;
    let tenant_a = app.ctx("tenant-a");
    let tenant_b = app.ctx("tenant-b");
    let foreign = app.seed_store(&tenant_a, "Central").await;

    let err = app
        .state
        .services
        .write_offs
        .create(
            &tenant_b,
            CreateWriteOffInput {
                name: "Sneaky".to_string(),
                shop_id: foreign.id.to_string(),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "STORE_NOT_FOUND");
}

#[tokio::test]
async fn products_fall_back_to_their_owning_tenant() {
    let app = TestApp::new().await;
    let tenant_a = app.ctx("tenant-a");
    let tenant_b = app.ctx("tenant-b");
    let shared = app.seed_product(&tenant_a, "SHARED", 9, dec!(5.0), dec!(2.0)).await;
    let shop = app.seed_store(&tenant_b, "B shop").await;
    let write_offs = &app.state.services.write_offs;

    let write_off = write_offs
        .create(
            &tenant_b,
            CreateWriteOffInput {
                name: "Cross tenant".to_string(),
                shop_id: shop.id.to_string(),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();
    write_offs
        .update(
            &tenant_b,
            write_off.meta.id,
            UpdateWriteOffInput {
                items: Some(vec![stock_item(shared.id, 2)]),
                action: Some("approve".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The decrement lands on the product row owned by tenant A.
    assert_eq!(app.stock_of(&tenant_a, shared.id).await, 7);

    // The catalog itself stays tenant scoped.
    let err = app
        .state
        .services
        .products
        .get(&tenant_b, shared.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn list_filters_by_status_and_paginates() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let from = app.seed_store(&ctx, "Central").await;
    let to = app.seed_store(&ctx, "Riverside").await;
    let transfers = &app.state.services.transfers;

    let mut ids = Vec::new();
    for n in 0..3 {
        let created = transfers
            .create(
                &ctx,
                CreateTransferInput {
                    name: format!("Transfer {}", n),
                    departure_shop_id: from.id.to_string(),
                    arrival_shop_id: to.id.to_string(),
                    comment: None,
                },
            )
            .await
            .unwrap();
        ids.push(created.meta.id);
    }
    transfers
        .update(
            &ctx,
            ids[0],
            UpdateTransferInput {
                action: Some("reject".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rejected = transfers
        .list(
            &ctx,
            &ListDocumentsQuery {
                status: Some("rejected".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.total, 1);
    assert_eq!(rejected.items[0].meta.id, ids[0]);

    let first_page = transfers
        .list(
            &ctx,
            &ListDocumentsQuery {
                page: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first_page.total, 3);
    assert_eq!(first_page.items.len(), 2);
    assert_eq!(first_page.total_pages, 2);

    let by_shop = transfers
        .list(
            &ctx,
            &ListDocumentsQuery {
                shop_id: Some(uuid::Uuid::new_v4().to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_shop.total, 0);
}
