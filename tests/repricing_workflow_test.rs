mod common;

use common::{repricing_item, TestApp};
use rust_decimal_macros::dec;
use stock_workflow_api::{
    entities::workflow_document::DocumentStatus,
    services::repricings::{CreateRepricingInput, UpdateRepricingInput},
    services::workflow::RepricingItemInput,
};

#[tokio::test]
async fn approving_a_repricing_writes_new_prices_only() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "BREAD", 12, dec!(3.0), dec!(1.5)).await;
    let service = &app.state.services.repricings;

    // Repricings may be tenant wide.
    let repricing = service
        .create(
            &ctx,
            CreateRepricingInput {
                name: "Spring prices".to_string(),
                shop_id: None,
                doc_type: Some("planned".to_string()),
                comment: None,
            },
        )
        .await
        .unwrap();
    assert!(repricing.shop.is_none());

    let with_items = service
        .update(
            &ctx,
            repricing.meta.id,
            UpdateRepricingInput {
                items: Some(vec![repricing_item(product.id, dec!(1.8), dec!(3.5))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let line = &with_items.items[0];
    assert_eq!(line.old_supply_price, dec!(1.5));
    assert_eq!(line.old_retail_price, dec!(3.0));
    assert_eq!(line.qty, 12);
    assert_eq!(with_items.totals.total_items_count, 1);
    assert_eq!(with_items.totals.total, dec!(42.0));

    let approved = service.approve(&ctx, repricing.meta.id).await.unwrap();
    assert_eq!(approved.meta.status, DocumentStatus::Approved);

    let product = app.state.services.products.get(&ctx, product.id).await.unwrap();
    assert_eq!(product.price, dec!(3.5));
    assert_eq!(product.cost_price, dec!(1.8));
    assert_eq!(product.stock, 12);
}

#[tokio::test]
async fn explicit_quantity_overrides_stock_default() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "BREAD", 12, dec!(3.0), dec!(1.5)).await;
    let shop = app.seed_store(&ctx, "Central").await;
    let service = &app.state.services.repricings;

    let repricing = service
        .create(
            &ctx,
            CreateRepricingInput {
                name: "Shelf labels".to_string(),
                shop_id: Some(shop.id.to_string()),
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();

    let updated = service
        .update(
            &ctx,
            repricing.meta.id,
            UpdateRepricingInput {
                items: Some(vec![RepricingItemInput {
                    product_id: product.id.to_string(),
                    qty: Some(2),
                    supply_price: dec!(1.5),
                    retail_price: dec!(4.0),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.items[0].qty, 2);
    assert_eq!(updated.totals.total, dec!(8.0));
}

#[tokio::test]
async fn rejected_repricing_keeps_old_prices() {
    let app = TestApp::new().await;
    let ctx = app.ctx("tenant-a");
    let product = app.seed_product(&ctx, "BREAD", 12, dec!(3.0), dec!(1.5)).await;
    let service = &app.state.services.repricings;

    let repricing = service
        .create(
            &ctx,
            CreateRepricingInput {
                name: "Cancelled promo".to_string(),
                shop_id: None,
                doc_type: None,
                comment: None,
            },
        )
        .await
        .unwrap();

    let rejected = service
        .update(
            &ctx,
            repricing.meta.id,
            UpdateRepricingInput {
                items: Some(vec![repricing_item(product.id, dec!(1.0), dec!(2.0))]),
                action: Some("reject".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.meta.status, DocumentStatus::Rejected);

    let product = app.state.services.products.get(&ctx, product.id).await.unwrap();
    assert_eq!(product.price, dec!(3.0));
    assert_eq!(product.cost_price, dec!(1.5));
}
